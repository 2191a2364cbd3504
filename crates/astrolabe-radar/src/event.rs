// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};

use astrolabe_structures::{EventKind, EventTarget, InboundEvent, NowMs, TrackId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LifecycleError;

/// One sensor return for one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub track_id: TrackId,
    pub range_m: Option<f64>,
}

impl Detection {
    pub fn new(track_id: impl Into<TrackId>) -> Self {
        Self {
            track_id: track_id.into(),
            range_m: None,
        }
    }

    pub fn with_range(mut self, range_m: f64) -> Self {
        self.range_m = Some(range_m);
        self
    }
}

impl TryFrom<&InboundEvent> for Detection {
    type Error = LifecycleError;

    fn try_from(event: &InboundEvent) -> Result<Self, Self::Error> {
        let track_id = match (&event.kind, &event.target) {
            (EventKind::Detection, EventTarget::Track(id)) => id.clone(),
            _ => {
                return Err(LifecycleError::InvalidDetection(format!(
                    "'{}' event for '{}' is not a track detection",
                    event.kind,
                    event.target.entity_key()
                )))
            }
        };
        let range_m = event
            .range_m()
            .map_err(|e| LifecycleError::InvalidDetection(e.to_string()))?;
        Ok(Self { track_id, range_m })
    }
}

/// Every detection of one full sensor scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    pub observed_at_ms: NowMs,
    pub detections: Vec<Detection>,
}

/// Outward-facing incident transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentTransition {
    /// First confirmation of an incident instance
    Confirmed,
    /// A lost track came back before auto-resolution
    Reacquired,
    Lost,
    Resolved,
}

impl IncidentTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentTransition::Confirmed => "confirmed",
            IncidentTransition::Reacquired => "reacquired",
            IncidentTransition::Lost => "lost",
            IncidentTransition::Resolved => "resolved",
        }
    }
}

impl Display for IncidentTransition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raised for every transition to CONFIRMED, LOST or RESOLVED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub track_id: TrackId,
    pub incident_id: Uuid,
    pub transition: IncidentTransition,
    /// When the transition took effect. Timer transitions carry their deadline.
    pub at_ms: NowMs,
    /// Most recent range of the track
    pub range_m: Option<f64>,
    /// The track is acknowledged; consumers must not re-alert
    pub alert_suppressed: bool,
}
