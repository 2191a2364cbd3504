// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Rule-set load failures. Fatal at startup; nothing is partially loaded.
#[derive(Debug, thiserror::Error)]
pub enum RuleSetLoadError {
    #[error("Failed to read incident rules {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed incident rules: {0}")]
    Malformed(String),

    #[error("Unsupported incident rules version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Incident rule at index {0} has no id")]
    MissingId(usize),

    #[error("Duplicate incident rule id '{0}'")]
    DuplicateId(String),

    #[error("Incident rule '{rule_id}' has an invalid match: {reason}")]
    InvalidMatch { rule_id: String, reason: String },
}

/// Durable history failures
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Audit log {} I/O failure: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize audit entry: {0}")]
    Serialize(String),

    #[error("Corrupt audit log line {line}: {reason}")]
    Corrupt { line: usize, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Unknown incident rule '{0}'")]
    UnknownRule(String),

    #[error("Audit source must identify the caller")]
    BlankSource,

    /// The change was rolled back because it could not be recorded
    #[error("Audit write failed; change rolled back: {0}")]
    AuditWrite(#[source] AuditError),
}
