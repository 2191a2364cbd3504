// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every check runs; the error lists all problems found.

use crate::{AstrolabeConfig, ConfigError, ConfigResult, RuntimeConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &AstrolabeConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    check_runtime(&config.runtime, &mut errors);
    check_paths(config, &mut errors);
    check_ingress(config, &mut errors);
    check_logging(config, &mut errors);

    into_result(errors)
}

/// Validate the radar timing options on their own
pub fn validate_runtime(runtime: &RuntimeConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();
    check_runtime(runtime, &mut errors);
    into_result(errors)
}

fn into_result(errors: Vec<ConfigValidationError>) -> ConfigResult<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

fn check_runtime(runtime: &RuntimeConfig, errors: &mut Vec<ConfigValidationError>) {
    if runtime.confirm_frames < 1 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "runtime.confirm_frames".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let durations = [
        ("runtime.cooldown_s", runtime.cooldown_s),
        ("runtime.lost_contact_window_s", runtime.lost_contact_window_s),
        ("runtime.auto_resolve_after_lost_s", runtime.auto_resolve_after_lost_s),
        ("runtime.ack_snooze_s", runtime.ack_snooze_s),
    ];
    for (field, value) in durations {
        if !value.is_finite() || value < 0.0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: field.to_string(),
                reason: format!("must be a finite number of seconds >= 0, got {}", value),
            });
        }
    }
}

fn check_paths(config: &AstrolabeConfig, errors: &mut Vec<ConfigValidationError>) {
    let paths = [
        ("paths.guard_table_path", &config.paths.guard_table_path),
        ("paths.incident_rules_path", &config.paths.incident_rules_path),
        ("paths.audit_log_path", &config.paths.audit_log_path),
    ];
    for (field, path) in paths {
        if path.as_os_str().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: field.to_string(),
            });
        }
    }
}

fn check_ingress(config: &AstrolabeConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.ingress.shards < 1 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "ingress.shards".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if config.ingress.channel_capacity < 1 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "ingress.channel_capacity".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if config.ingress.default_subsystem_id.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "ingress.default_subsystem_id".to_string(),
        });
    }
}

fn check_logging(config: &AstrolabeConfig, errors: &mut Vec<ConfigValidationError>) {
    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
        });
    }
}
