// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Astrolabe - spacecraft operations decision path
//!
//! Turns raw sensor events into gated subsystem state transitions and
//! operator-visible incidents.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! astrolabe = "0.0.1-beta.18"  # Default: decision path + async services
//! ```
//!
//! ## Feature Flags
//!
//! - **`services`** (default): [`DecisionPipeline`](services::DecisionPipeline)
//!   wiring and the tokio-based event ingress
//! - **`file-logging`**: rolling JSON log files next to console output
//!
//! ## Usage
//!
//! ```rust
//! use astrolabe::prelude::*;
//!
//! // Guard table: a critical rule vetoes `start` inside 10 m.
//! let table = GuardTable::from_json_str(
//!     r#"{"schema_version": 1, "rules": [{"rule_id": "R1", "severity": "critical",
//!         "fsm_event": "start", "min_range_m": 0, "max_range_m": 10}]}"#,
//!     LoadOptions::default(),
//! )?;
//! let decision = table.evaluate(FsmEventKind::Start, &SensorReading::new(5.0)?);
//! assert!(matches!(decision, Decision::Escalate { .. }));
//!
//! // Radar lifecycle: one detection confirms with confirm_frames = 1.
//! let mut radar = RadarLifecycle::new(RuntimeConfig { confirm_frames: 1, ..Default::default() })?;
//! let events = radar.observe_detection(&Detection::new("DEB-1").with_range(42.0), 0)?;
//! assert_eq!(events[0].transition, IncidentTransition::Confirmed);
//!
//! // FSM: IDLE --start--> ACTIVE
//! let active = FsmEngine::new().handle(&Snapshot::new("eps-1"), &FsmEvent::new("eps-1", FsmEventKind::Start))?;
//! assert_eq!(active.state, FsmState::Active);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: astrolabe-structures, -serialization       │
//! │  (Snapshot, InboundEvent, two wire encodings)           │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Decision path: radar → incident-rules → guard → fsm    │
//! │  (pure, synchronous, no I/O except the audit log)       │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Infrastructure: astrolabe-state-manager                │
//! │  (operating mode, snapshot registry)                    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Boundary: astrolabe-services                           │
//! │  (sharded async ingress, outcome publishing)            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use astrolabe_config as config;
pub use astrolabe_observability as observability;
pub use astrolabe_serialization as serialization;
pub use astrolabe_structures as structures;

// Re-export decision path
pub use astrolabe_fsm as fsm;
pub use astrolabe_guard as guard;
pub use astrolabe_incident_rules as incident_rules;
pub use astrolabe_radar as radar;

// Re-export infrastructure
pub use astrolabe_state_manager as state_manager;

#[cfg(feature = "services")]
pub use astrolabe_services as services;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::structures::{
        EventKind, EventTarget, FsmEvent, FsmEventKind, FsmState, InboundEvent, NowMs,
        SensorReading, Severity, Snapshot, SubsystemId, TrackId,
    };

    pub use crate::serialization::{
        BinaryProtocolCodec, EventCodec, StructuredRecordCodec, WireEncoding,
    };

    pub use crate::config::{load_config, AstrolabeConfig, RuntimeConfig};

    pub use crate::fsm::{FsmEngine, FsmError};
    pub use crate::guard::{Decision, GuardTable, GuardTableHandle, LoadOptions};
    pub use crate::incident_rules::{
        AuditEntry, AuditSink, IncidentRuleRepository, JsonlAuditLog, RuleSet,
    };
    pub use crate::radar::{
        ContactState, Detection, DetectionFrame, IncidentTransition, LifecycleEvent,
        RadarLifecycle,
    };

    pub use crate::state_manager::{ModeStore, OperatingMode, SnapshotRegistry};

    #[cfg(feature = "services")]
    pub use crate::services::{
        DecisionOutcome, DecisionPipeline, EventIngress, IngressHandle, IngressReport,
        OutcomePublisher, ServiceError,
    };
}
