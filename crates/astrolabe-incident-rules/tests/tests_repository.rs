// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Rule toggling against real and failing audit sinks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use astrolabe_incident_rules::{
    read_history, AuditEntry, AuditError, AuditSink, IncidentRuleRepository, JsonlAuditLog,
    RepositoryError, RuleSet,
};
use tempfile::TempDir;

const RULES: &str = r#"{"version": 1, "rules": [
    {"id": "debris-close", "enabled": true, "title": "Debris inside 500 m",
     "match": {"transition": "confirmed", "track_prefix": "DEB-", "max_range_m": 500},
     "emit": {"subsystem_id": "collision-avoidance"}},
    {"id": "resolve-stop", "enabled": false, "title": "Stop on resolution",
     "match": {"transition": "resolved"}}
]}"#;

/// Sink that fails on demand.
struct FlakySink {
    failing: AtomicBool,
}

impl AuditSink for FlakySink {
    fn append(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuditError::Serialize("disk full".to_string()));
        }
        Ok(())
    }
}

fn write_rules(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("incident_rules.json");
    std::fs::write(&path, RULES).unwrap();
    path
}

#[test]
fn test_toggle_writes_exactly_one_entry() {
    let dir = TempDir::new().unwrap();
    let audit_path = dir.path().join("audit.jsonl");
    let audit = Arc::new(JsonlAuditLog::open(&audit_path).unwrap());
    let repo = IncidentRuleRepository::load(write_rules(&dir), audit).unwrap();

    repo.set_enabled("debris-close", false, "console:rules-panel").unwrap();
    assert!(!repo.rules().get("debris-close").unwrap().enabled);

    let history = read_history(&audit_path).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].rule_id, "debris-close");
    assert!(history[0].old_enabled);
    assert!(!history[0].new_enabled);
    assert_eq!(history[0].source, "console:rules-panel");

    repo.set_enabled("resolve-stop", true, "console:rules-panel").unwrap();
    let history = read_history(&audit_path).unwrap();
    assert_eq!(history.len(), 2);
    assert!(!history[1].old_enabled);
    assert!(history[1].new_enabled);
}

#[test]
fn test_setting_same_value_is_still_audited() {
    let dir = TempDir::new().unwrap();
    let audit_path = dir.path().join("audit.jsonl");
    let audit = Arc::new(JsonlAuditLog::open(&audit_path).unwrap());
    let repo = IncidentRuleRepository::load(write_rules(&dir), audit).unwrap();

    let entry = repo.set_enabled("debris-close", true, "api:bulk-enable").unwrap();
    assert!(entry.old_enabled && entry.new_enabled);
    assert_eq!(read_history(&audit_path).unwrap(), vec![entry]);
}

#[test]
fn test_failed_append_leaves_rule_unchanged() {
    let sink = Arc::new(FlakySink {
        failing: AtomicBool::new(true),
    });
    let repo = IncidentRuleRepository::new(RuleSet::from_json_str(RULES).unwrap(), sink.clone());
    let before = repo.rules();

    let err = repo.set_enabled("debris-close", false, "console").unwrap_err();
    assert!(matches!(err, RepositoryError::AuditWrite(_)));
    assert!(repo.rules().get("debris-close").unwrap().enabled);
    assert_eq!(*repo.rules(), *before);

    sink.failing.store(false, Ordering::SeqCst);
    repo.set_enabled("debris-close", false, "console").unwrap();
    assert!(!repo.rules().get("debris-close").unwrap().enabled);
}

#[test]
fn test_unknown_rule_and_blank_source() {
    let dir = TempDir::new().unwrap();
    let audit_path = dir.path().join("audit.jsonl");
    let audit = Arc::new(JsonlAuditLog::open(&audit_path).unwrap());
    let repo = IncidentRuleRepository::load(write_rules(&dir), audit).unwrap();

    assert!(matches!(
        repo.set_enabled("nope", true, "console"),
        Err(RepositoryError::UnknownRule(id)) if id == "nope"
    ));
    assert!(matches!(
        repo.set_enabled("debris-close", false, "  "),
        Err(RepositoryError::BlankSource)
    ));
    assert!(read_history(&audit_path).unwrap().is_empty());
}

#[test]
fn test_readers_keep_their_snapshot() {
    let sink = Arc::new(FlakySink {
        failing: AtomicBool::new(false),
    });
    let repo = IncidentRuleRepository::new(RuleSet::from_json_str(RULES).unwrap(), sink);
    let held = repo.rules();
    repo.set_enabled("resolve-stop", true, "console").unwrap();

    assert!(!held.get("resolve-stop").unwrap().enabled);
    assert!(repo.rules().get("resolve-stop").unwrap().enabled);
}

#[test]
fn test_concurrent_toggles_each_audited_once() {
    let dir = TempDir::new().unwrap();
    let audit_path = dir.path().join("audit.jsonl");
    let audit = Arc::new(JsonlAuditLog::open(&audit_path).unwrap());
    let repo = Arc::new(IncidentRuleRepository::load(write_rules(&dir), audit).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                repo.set_enabled("debris-close", i % 2 == 0, &format!("worker-{}", i))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let history = read_history(&audit_path).unwrap();
    assert_eq!(history.len(), 8);
    // Each entry's old value is the previous entry's new value.
    assert!(history[0].old_enabled);
    for pair in history.windows(2) {
        assert_eq!(pair[1].old_enabled, pair[0].new_enabled);
    }
    assert_eq!(
        repo.rules().get("debris-close").unwrap().enabled,
        history[7].new_enabled
    );
}

#[test]
fn test_load_errors_are_fatal() {
    let dir = TempDir::new().unwrap();
    let sink = Arc::new(FlakySink {
        failing: AtomicBool::new(false),
    });
    assert!(IncidentRuleRepository::load(dir.path().join("missing.json"), sink).is_err());
}
