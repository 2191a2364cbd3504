// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `astrolabe.toml`. Missing keys take the
//! defaults below.

use std::path::PathBuf;

use astrolabe_structures::seconds_to_ms;
use serde::{Deserialize, Serialize};

pub use astrolabe_observability::{LogFormat, LoggingConfig};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AstrolabeConfig {
    pub runtime: RuntimeConfig,
    pub paths: PathsConfig,
    pub guard: GuardConfig,
    pub ingress: IngressConfig,
    pub logging: LoggingConfig,
}

/// Radar lifecycle timing. Fixed for the lifetime of a running instance.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Consecutive detections required before a track is confirmed
    pub confirm_frames: u32,
    /// Quiet period after resolution during which a track cannot reopen
    pub cooldown_s: f64,
    /// Silence after which a confirmed track is lost
    pub lost_contact_window_s: f64,
    /// Time in LOST after which a track resolves on its own
    pub auto_resolve_after_lost_s: f64,
    /// Alert suppression granted by one operator acknowledgment
    pub ack_snooze_s: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            confirm_frames: 3,
            cooldown_s: 30.0,
            lost_contact_window_s: 5.0,
            auto_resolve_after_lost_s: 60.0,
            ack_snooze_s: 300.0,
        }
    }
}

impl RuntimeConfig {
    pub fn cooldown_ms(&self) -> u64 {
        seconds_to_ms(self.cooldown_s)
    }

    pub fn lost_contact_window_ms(&self) -> u64 {
        seconds_to_ms(self.lost_contact_window_s)
    }

    pub fn auto_resolve_after_lost_ms(&self) -> u64 {
        seconds_to_ms(self.auto_resolve_after_lost_s)
    }

    pub fn ack_snooze_ms(&self) -> u64 {
        seconds_to_ms(self.ack_snooze_s)
    }
}

/// File locations. Each path is independently overridable.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub guard_table_path: PathBuf,
    pub incident_rules_path: PathBuf,
    pub audit_log_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            guard_table_path: PathBuf::from("config/guard_table.json"),
            incident_rules_path: PathBuf::from("config/incident_rules.json"),
            audit_log_path: PathBuf::from("state/incident_rule_audit.jsonl"),
        }
    }
}

/// Guard-table load contract
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Refuse to start with an empty guard table
    pub require_non_empty: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            require_non_empty: true,
        }
    }
}

/// Wire encoding accepted by the ingress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngressEncoding {
    /// Detect per message from its first byte
    Auto,
    StructuredRecord,
    BinaryProtocol,
}

/// Event ingestion boundary
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IngressConfig {
    /// Number of per-key serialized worker shards
    pub shards: usize,
    /// Bounded queue depth of each shard
    pub channel_capacity: usize,
    /// Subsystem driven by incident rules that do not name one
    pub default_subsystem_id: String,
    pub encoding: IngressEncoding,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            shards: 4,
            channel_capacity: 1024,
            default_subsystem_id: "radar-response".to_string(),
            encoding: IngressEncoding::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_ms_helpers() {
        let runtime = RuntimeConfig {
            confirm_frames: 1,
            cooldown_s: 1.5,
            lost_contact_window_s: 2.0,
            auto_resolve_after_lost_s: 5.0,
            ack_snooze_s: 0.0,
        };
        assert_eq!(runtime.cooldown_ms(), 1500);
        assert_eq!(runtime.lost_contact_window_ms(), 2000);
        assert_eq!(runtime.auto_resolve_after_lost_ms(), 5000);
        assert_eq!(runtime.ack_snooze_ms(), 0);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: AstrolabeConfig = toml::from_str("[runtime]\nconfirm_frames = 1\n").unwrap();
        assert_eq!(config.runtime.confirm_frames, 1);
        assert_eq!(config.runtime.cooldown_s, 30.0);
        assert_eq!(config.ingress, IngressConfig::default());
    }

    #[test]
    fn test_encoding_names() {
        let config: AstrolabeConfig =
            toml::from_str("[ingress]\nencoding = \"binary_protocol\"\n").unwrap();
        assert_eq!(config.ingress.encoding, IngressEncoding::BinaryProtocol);
        assert!(toml::from_str::<AstrolabeConfig>("[ingress]\nencoding = \"xml\"\n").is_err());
    }
}
