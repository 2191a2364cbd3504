// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # astrolabe-config
//!
//! Runtime tunables and file locations for the decision path, read from
//! `astrolabe.toml` and then overridden by `ASTROLABE_*` variables and
//! explicit CLI keys, in that order. The merged result is checked as a
//! whole; every failed check is reported in one error.
//!
//! ```rust,no_run
//! use astrolabe_config::load_config;
//!
//! let config = load_config(None, None)?;
//! assert!(config.runtime.confirm_frames >= 1);
//! # Ok::<(), astrolabe_config::ConfigError>(())
//! ```

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

use std::path::PathBuf;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, validate_runtime, ConfigValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No file at the explicit location, or none found by searching
    #[error("no configuration file: {0}")]
    FileNotFound(String),

    #[error("cannot read {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid TOML: {reason}")]
    ParseError { path: PathBuf, reason: String },

    /// One or more checks failed on the merged configuration
    #[error("configuration rejected: {0}")]
    ValidationError(String),

    /// An environment or CLI override did not parse
    #[error("bad override: {0}")]
    InvalidValue(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
