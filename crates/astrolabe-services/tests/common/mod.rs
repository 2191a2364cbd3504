// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::sync::Arc;

use astrolabe_guard::{GuardTable, GuardTableHandle, LoadOptions};
use astrolabe_incident_rules::{IncidentRuleRepository, JsonlAuditLog, RuleSet};
use astrolabe_services::DecisionPipeline;
use astrolabe_state_manager::{ModeStore, OperatingMode, SnapshotRegistry};
use astrolabe_structures::SubsystemId;
use tempfile::TempDir;

pub const GUARD_TABLE: &str = r#"{"schema_version": 1, "rules": [
    {"rule_id": "R1", "description": "Too close to start", "severity": "critical",
     "fsm_event": "start", "min_range_m": 0, "max_range_m": 10},
    {"rule_id": "D1", "description": "Hold inside keep-out shell", "severity": "warning",
     "fsm_event": "start", "min_range_m": 100, "max_range_m": 200},
    {"rule_id": "A1", "description": "Far field advisory", "severity": "info",
     "fsm_event": "start", "min_range_m": 300, "max_range_m": 400}
]}"#;

pub const INCIDENT_RULES: &str = r#"{"version": 1, "rules": [
    {"id": "debris-start", "enabled": true, "title": "Debris confirmed",
     "match": {"transition": ["confirmed", "reacquired"], "track_prefix": "DEB-"},
     "emit": {"subsystem_id": "collision-avoidance"}},
    {"id": "debris-stop", "enabled": true, "title": "Debris cleared",
     "match": {"transition": "resolved", "track_prefix": "DEB-"},
     "emit": {"subsystem_id": "collision-avoidance"}},
    {"id": "satellite-watch", "enabled": false, "title": "Satellite proximity",
     "match": {"transition": "confirmed", "track_prefix": "SAT-"}}
]}"#;

pub struct Fixture {
    pub dir: TempDir,
    pub pipeline: Arc<DecisionPipeline>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let audit = Arc::new(JsonlAuditLog::open(dir.path().join("audit.jsonl")).unwrap());
        let rules = IncidentRuleRepository::new(RuleSet::from_json_str(INCIDENT_RULES).unwrap(), audit);
        let guard = GuardTable::from_json_str(GUARD_TABLE, LoadOptions::default()).unwrap();

        let pipeline = DecisionPipeline::new(
            Arc::new(GuardTableHandle::new(guard)),
            Arc::new(rules),
            Arc::new(SnapshotRegistry::new()),
            Arc::new(ModeStore::new(OperatingMode::Nominal)),
            SubsystemId::from("radar-response"),
        );
        Self {
            dir,
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn audit_path(&self) -> std::path::PathBuf {
        self.dir.path().join("audit.jsonl")
    }
}
