// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Astrolabe State Manager
//!
//! The only mutable state shared across entities outside the rule repository:
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   ModeStore                         │  ← one RwLock, read-mostly
//! │   (process-wide operating mode)     │
//! └─────────────────────────────────────┘
//!           ↓
//! ┌─────────────────────────────────────┐
//! │   SnapshotRegistry                  │  ← one FSM snapshot per subsystem
//! └─────────────────────────────────────┘
//! ```
//!
//! Neither is reached implicitly. Callers obtain a handle once (for the mode,
//! usually [`ModeStore::global`]) and pass it to whatever needs it.
//!
//! ```rust
//! use astrolabe_state_manager::{ModeStore, OperatingMode};
//!
//! let store = ModeStore::new(OperatingMode::Nominal);
//! store.set(OperatingMode::Safe);
//! assert_eq!(store.get(), OperatingMode::Safe);
//! store.reset();
//! assert_eq!(store.get(), OperatingMode::Nominal);
//! ```

pub mod mode;
pub mod snapshots;

pub use mode::{ModeStore, OperatingMode, MODE_ENV_VAR};
pub use snapshots::SnapshotRegistry;

/// State manager error types
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Operating mode name not recognised
    #[error("Unknown operating mode '{0}' (expected nominal, safe or maintenance)")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, StateError>;
