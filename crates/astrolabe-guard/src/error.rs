// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Guard-table load failures. A table that fails any check is never activated.
#[derive(Debug, thiserror::Error)]
pub enum GuardTableLoadError {
    #[error("Failed to read guard table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed guard table: {0}")]
    Malformed(String),

    #[error("Unsupported guard table schema_version {found} (supported: {supported})")]
    UnsupportedSchemaVersion { found: u32, supported: u32 },

    #[error("Duplicate rule_id '{0}'")]
    DuplicateRuleId(String),

    #[error("Rule at index {0} has a blank rule_id")]
    BlankRuleId(usize),

    #[error("Rule '{rule_id}' has min_range_m {min} greater than max_range_m {max}")]
    InvertedRange { rule_id: String, min: f64, max: f64 },

    #[error("Rule '{0}' has a non-finite range bound")]
    NonFiniteBound(String),

    #[error("Guard table has no rules but a non-empty table is required")]
    EmptyRuleSet,
}

pub type GuardResult<T> = Result<T, GuardTableLoadError>;
