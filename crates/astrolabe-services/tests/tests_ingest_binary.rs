// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The `astrolabe-ingest` binary over stdin with a file-backed configuration.

mod common;

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use astrolabe_serialization::{EventCodec, StructuredRecordCodec};
use astrolabe_structures::{EventKind, EventTarget, InboundEvent, TrackId};
use common::{GUARD_TABLE, INCIDENT_RULES};
use tempfile::TempDir;

fn write_workspace(dir: &Path) -> std::path::PathBuf {
    let guard = dir.join("guard_table.json");
    let rules = dir.join("incident_rules.json");
    fs::write(&guard, GUARD_TABLE).unwrap();
    fs::write(&rules, INCIDENT_RULES).unwrap();

    let config = dir.join("astrolabe.toml");
    fs::write(
        &config,
        format!(
            "[runtime]\nconfirm_frames = 1\nlost_contact_window_s = 2\nauto_resolve_after_lost_s = 5\n\
             [paths]\nguard_table_path = '{}'\nincident_rules_path = '{}'\naudit_log_path = '{}'\n\
             [ingress]\nshards = 2\n",
            guard.display(),
            rules.display(),
            dir.join("audit.jsonl").display()
        ),
    )
    .unwrap();
    config
}

fn run_ingest(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_astrolabe-ingest"))
        .args(args)
        .env_remove("ASTROLABE_MODE")
        .env_remove("ASTROLABE_DEBUG")
        .env_remove("ASTROLABE_CONFIG_PATH")
        .env_remove("ASTROLABE_INGRESS_SHARDS")
        .env_remove("ASTROLABE_LOG_LEVEL")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn detection_line(track: &str, at_ms: u64, range_m: &str) -> String {
    let event = InboundEvent::new(EventKind::Detection, EventTarget::Track(TrackId::from(track)), at_ms)
        .with_payload("range_m", range_m);
    String::from_utf8(StructuredRecordCodec::new().encode_event(&event).unwrap()).unwrap()
}

#[test]
fn test_stdin_lines_drive_the_decision_path() {
    let dir = TempDir::new().unwrap();
    let config = write_workspace(dir.path());
    let stdin = format!("{}\n\nnot a message\n", detection_line("DEB-1", 0, "50"));

    let output = run_ingest(
        &["--config", config.to_str().unwrap(), "--final-sweep-ms", "10000"],
        &stdin,
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Track 'DEB-1'"), "stdout: {}", stdout);
    assert!(stdout.contains("Message 2 rejected"), "stdout: {}", stdout);
    assert!(stdout.contains("Final sweep at 10000 ms"), "stdout: {}", stdout);
    assert!(stdout.contains("Processed 2 events (1 rejected)"), "stdout: {}", stdout);
}

#[test]
fn test_debug_selection_is_accepted_alongside_clap_flags() {
    let dir = TempDir::new().unwrap();
    let config = write_workspace(dir.path());

    let output = run_ingest(
        &[
            "--debug-astrolabe-radar",
            "--config",
            config.to_str().unwrap(),
            "--shards",
            "1",
        ],
        "",
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Debug logging for"), "stdout: {}", stdout);
    assert!(stdout.contains("started with 1 shards"), "stdout: {}", stdout);
    assert!(stdout.contains("Processed 0 events (0 rejected)"), "stdout: {}", stdout);
}

#[test]
fn test_missing_configuration_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let output = run_ingest(&["--config", missing.to_str().unwrap()], "");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load configuration"));
}
