// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sensor-side types: track identifiers, readings and rule severities.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::common_macros::define_entity_id;
use crate::DataError;

define_entity_id!(
    /// Identifies one radar sensor track.
    TrackId,
    "track_id"
);

/// Milliseconds in a monotonic clock domain provided by the caller.
pub type NowMs = u64;

/// Converts a configured duration in seconds to the millisecond clock domain.
pub fn seconds_to_ms(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}

/// A live sensor reading used to gate state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub range_m: f64,
}

impl SensorReading {
    pub fn new(range_m: f64) -> Result<Self, DataError> {
        if !range_m.is_finite() {
            return Err(DataError::BadParameters(format!(
                "range_m must be finite, got {}",
                range_m
            )));
        }
        Ok(Self { range_m })
    }
}

/// Rule severity. Ordered so that `Critical` is the greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        };
        write!(f, "{name}")
    }
}
