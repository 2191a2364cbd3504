// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # astrolabe-radar
//!
//! Radar situation lifecycle. Converts a noisy per-track detection stream into
//! incidents:
//!
//! ```text
//! NEW -> CONFIRMING -> CONFIRMED -> LOST -> RESOLVED
//!  ^          |            ^         |        |
//!  +--miss----+            +-detect--+        +-- cooldown, then reopen
//! ```
//!
//! Transitions to CONFIRMED, LOST and RESOLVED are reported as
//! [`LifecycleEvent`]s for the decision pipeline to act on.

mod contact;
mod error;
mod event;
mod lifecycle;

pub use contact::{ContactState, TrackContact};
pub use error::{LifecycleError, LifecycleResult};
pub use event::{Detection, DetectionFrame, IncidentTransition, LifecycleEvent};
pub use lifecycle::RadarLifecycle;

pub use astrolabe_config::RuntimeConfig;
