// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Astrolabe Subsystem State Machine

Pure transition function over the canonical [`Snapshot`]:

```text
IDLE ──start──▶ ACTIVE ──stop──▶ SHUTDOWN (terminal, every event is a no-op)
```

The engine never sees a wire encoding. [`FsmEngine::handle_encoded`] accepts any
[`EventCodec`] and reduces both inputs to the canonical model before the
transition runs, so the same event produces the same state regardless of how
it was carried.

```rust
use astrolabe_fsm::FsmEngine;
use astrolabe_structures::{FsmEvent, FsmEventKind, FsmState, Snapshot};

let engine = FsmEngine::new();
let idle = Snapshot::new("eps-1");
let active = engine.handle(&idle, &FsmEvent::new("eps-1", FsmEventKind::Start)).unwrap();
assert_eq!(active.state, FsmState::Active);
```
*/

mod engine;

pub use engine::{FsmEngine, FsmError, FsmResult};
