// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Astrolabe Service Layer

The application boundary of the decision path. Transport adapters hand raw
messages to [`IngressHandle`]; everything behind it is synchronous and pure
except the audit log and the outcome publisher.

## Architecture

```text
┌─────────────────────────────────────────────────────────────────┐
│                    TRANSPORT ADAPTERS                           │
│  sensor bus, operator console, command uplink                   │
└────────────────────────────┬────────────────────────────────────┘
                             ↓ raw bytes (either wire encoding)
┌─────────────────────────────────────────────────────────────────┐
│              SERVICE LAYER (This Crate)                         │
│  • EventIngress      - decode, validate, route by entity key    │
│  • DecisionPipeline  - rules → guard → FSM                      │
│  • OutcomePublisher  - reports to downstream consumers          │
└────────────────────────────┬────────────────────────────────────┘
                             ↓
┌─────────────────────────────────────────────────────────────────┐
│                   DOMAIN LAYER                                  │
│  astrolabe-radar, astrolabe-incident-rules, astrolabe-guard,    │
│  astrolabe-fsm, astrolabe-state-manager                         │
└─────────────────────────────────────────────────────────────────┘
```
*/

pub mod errors;
pub mod ingress;
pub mod pipeline;
pub mod publisher;

pub use errors::{ServiceError, ServiceResult};
pub use ingress::{EventIngress, IngressHandle};
pub use pipeline::{
    DecisionOutcome, DecisionPipeline, Trigger, INCIDENT_ID_PAYLOAD_KEY,
    INCIDENT_RULE_PAYLOAD_KEY, TRACK_ID_PAYLOAD_KEY,
};
pub use publisher::{ChannelPublisher, IngressReport, OutcomePublisher, TracingPublisher};
