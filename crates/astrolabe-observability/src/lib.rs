// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # astrolabe-observability
//!
//! Logging infrastructure shared by every astrolabe crate.
//!
//! Provides consistent tracing setup with per-crate debug flag support and the
//! greppable failure tags used wherever an error is caught at a resource-release
//! or durability boundary.
//!
//! ## Features
//! - `file-logging`: daily-rolling JSON log files with run-folder retention

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod failure_tags;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known astrolabe crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "astrolabe-structures",
    "astrolabe-serialization",
    "astrolabe-fsm",
    "astrolabe-guard",
    "astrolabe-incident-rules",
    "astrolabe-radar",
    "astrolabe-state-manager",
    "astrolabe-services",
    "astrolabe-config",
];
