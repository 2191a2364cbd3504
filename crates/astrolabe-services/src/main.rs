// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `astrolabe-ingest`: feeds newline-delimited wire messages from stdin
//! through the event ingress and logs every decision.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use astrolabe_config::load_config;
use astrolabe_observability::{debug_flags_help, init_logging, is_debug_flag, parse_debug_flags};
use astrolabe_services::{DecisionPipeline, EventIngress, TracingPublisher};
use astrolabe_state_manager::ModeStore;
use astrolabe_structures::NowMs;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Astrolabe ingest - replay radar and subsystem events through the decision path
#[derive(Parser, Debug)]
#[command(name = "astrolabe-ingest", version, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// Configuration file (searched for as astrolabe.toml when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append-only incident audit log
    #[arg(long)]
    audit_log_path: Option<PathBuf>,

    /// Number of ingress shards
    #[arg(long)]
    shards: Option<usize>,

    /// Sweep every track's timers at this time (ms) once stdin is exhausted
    #[arg(long)]
    final_sweep_ms: Option<NowMs>,
}

impl Args {
    /// Keys understood by `astrolabe_config::apply_cli_overrides`.
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(path) = &self.audit_log_path {
            overrides.insert("audit_log_path".to_string(), path.display().to_string());
        }
        if let Some(shards) = self.shards {
            overrides.insert("ingress_shards".to_string(), shards.to_string());
        }
        overrides
    }
}

/// Separate `--debug-*` selections from the arguments clap parses.
fn split_debug_args<I>(args: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    args.into_iter().partition(|arg| is_debug_flag(arg))
}

#[tokio::main]
async fn main() -> Result<()> {
    let (debug_args, args) = split_debug_args(std::env::args());
    let args = Args::parse_from(args);
    let debug_flags = parse_debug_flags(debug_args);

    let config = load_config(args.config.as_deref(), Some(&args.overrides()))
        .context("Failed to load configuration")?;
    let _logging = init_logging(&debug_flags, &config.logging)?;
    if debug_flags.any_enabled() {
        info!(
            target: "astrolabe-services",
            "Debug logging for: {:?}",
            debug_flags.enabled_crates
        );
    }

    let mode = ModeStore::global().context("Failed to read the operating mode")?;
    let pipeline = DecisionPipeline::from_config(&config, mode)
        .context("Failed to build the decision pipeline")?;
    let ingress = EventIngress::spawn(
        &config.ingress,
        config.runtime,
        Arc::new(pipeline),
        Arc::new(TracingPublisher),
    )?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut processed = 0usize;
    let mut rejected = 0usize;
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        processed += 1;
        if let Err(err) = ingress.process(line.as_bytes()).await {
            rejected += 1;
            warn!(target: "astrolabe-services", "Message {} rejected: {}", processed, err);
        }
    }

    if let Some(now) = args.final_sweep_ms {
        let report = ingress.sweep(now).await?;
        info!(
            target: "astrolabe-services",
            "Final sweep at {} ms: {} lifecycle events, {} outcomes",
            now,
            report.lifecycle_events.len(),
            report.outcomes.len()
        );
    }
    ingress.shutdown().await?;

    info!(
        target: "astrolabe-services",
        "Processed {} events ({} rejected)",
        processed,
        rejected
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn debug_selections_are_split_from_clap_arguments() {
        let (debug, rest) = split_debug_args(strings(&[
            "astrolabe-ingest",
            "--debug-astrolabe-radar",
            "--config",
            "mission.toml",
            "--debug=astrolabe-guard,astrolabe-fsm",
        ]));
        assert_eq!(
            debug,
            strings(&["--debug-astrolabe-radar", "--debug=astrolabe-guard,astrolabe-fsm"])
        );

        let args = Args::parse_from(rest);
        assert_eq!(args.config, Some(PathBuf::from("mission.toml")));
        assert!(args.overrides().is_empty());
    }

    #[test]
    fn flags_become_config_overrides() {
        let args = Args::parse_from(strings(&[
            "astrolabe-ingest",
            "--audit-log-path",
            "/tmp/audit.jsonl",
            "--shards",
            "2",
            "--final-sweep-ms",
            "9000",
        ]));
        let overrides = args.overrides();

        assert_eq!(overrides.get("audit_log_path").map(String::as_str), Some("/tmp/audit.jsonl"));
        assert_eq!(overrides.get("ingress_shards").map(String::as_str), Some("2"));
        assert_eq!(args.final_sweep_ms, Some(9_000));
    }
}
