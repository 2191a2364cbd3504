// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};

use astrolabe_structures::{NowMs, TrackId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-track lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactState {
    New,
    Confirming,
    Confirmed,
    Lost,
    Resolved,
}

impl ContactState {
    /// Still accumulating consecutive hits
    pub fn is_debouncing(&self) -> bool {
        matches!(self, ContactState::New | ContactState::Confirming)
    }
}

impl Display for ContactState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContactState::New => "NEW",
            ContactState::Confirming => "CONFIRMING",
            ContactState::Confirmed => "CONFIRMED",
            ContactState::Lost => "LOST",
            ContactState::Resolved => "RESOLVED",
        };
        write!(f, "{name}")
    }
}

/// Everything the lifecycle knows about one track. Only the lifecycle mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackContact {
    pub track_id: TrackId,
    pub state: ContactState,
    /// Current incident instance; replaced when the track reopens
    pub incident_id: Uuid,
    pub consecutive_hits: u32,
    pub last_seen_at: NowMs,
    pub confirmed_at: Option<NowMs>,
    /// Last contact before the silence that made the track LOST
    pub lost_at: Option<NowMs>,
    pub resolved_at: Option<NowMs>,
    pub acked_until: Option<NowMs>,
    pub last_range_m: Option<f64>,
    /// Detections swallowed by the cooldown after resolution
    pub suppressed_reopens: u32,
}

impl TrackContact {
    pub(crate) fn open(track_id: TrackId, now: NowMs) -> Self {
        Self {
            track_id,
            state: ContactState::New,
            incident_id: Uuid::now_v7(),
            consecutive_hits: 0,
            last_seen_at: now,
            confirmed_at: None,
            lost_at: None,
            resolved_at: None,
            acked_until: None,
            last_range_m: None,
            suppressed_reopens: 0,
        }
    }

    /// Start a fresh incident instance on the same track.
    pub(crate) fn reopen(&mut self, now: NowMs) {
        self.state = ContactState::New;
        self.incident_id = Uuid::now_v7();
        self.consecutive_hits = 0;
        self.last_seen_at = now;
        self.confirmed_at = None;
        self.lost_at = None;
        self.resolved_at = None;
        self.suppressed_reopens = 0;
    }

    pub fn is_acknowledged(&self, now: NowMs) -> bool {
        self.acked_until.is_some_and(|until| now < until)
    }
}
