// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Guard-table policy engine.

A guard table is a versioned set of range-bounded safety rules. Evaluation is a
pure function of the proposed FSM event and the current sensor reading:

```
use astrolabe_guard::{Decision, GuardTable, LoadOptions};
use astrolabe_structures::{FsmEventKind, SensorReading, Severity};

let table = GuardTable::from_json_str(
    r#"{"schema_version": 1, "rules": [
        {"rule_id": "R1", "severity": "critical", "fsm_event": "start",
         "min_range_m": 0, "max_range_m": 10}
    ]}"#,
    LoadOptions::default(),
)
.unwrap();

let decision = table.evaluate(FsmEventKind::Start, &SensorReading::new(5.0).unwrap());
assert_eq!(
    decision,
    Decision::Escalate { rule_id: "R1".into(), severity: Severity::Critical }
);
```
*/

mod error;
mod handle;
mod rule;
mod table;

pub use error::{GuardResult, GuardTableLoadError};
pub use handle::GuardTableHandle;
pub use rule::{Decision, GuardRule, GuardTableDocument};
pub use table::{GuardTable, LoadOptions, SUPPORTED_SCHEMA_VERSION};
