// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use ahash::{AHashMap, AHashSet};
use astrolabe_config::{validate_runtime, RuntimeConfig};
use astrolabe_structures::{NowMs, TrackId};
use tracing::{debug, info};

use crate::contact::{ContactState, TrackContact};
use crate::error::{LifecycleError, LifecycleResult};
use crate::event::{Detection, DetectionFrame, IncidentTransition, LifecycleEvent};

/// Durations converted once to the millisecond clock.
#[derive(Debug, Clone, Copy)]
struct Timings {
    confirm_frames: u32,
    lost_contact_window_ms: u64,
    auto_resolve_after_lost_ms: u64,
    cooldown_ms: u64,
    ack_snooze_ms: u64,
}

impl From<&RuntimeConfig> for Timings {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            confirm_frames: config.confirm_frames,
            lost_contact_window_ms: config.lost_contact_window_ms(),
            auto_resolve_after_lost_ms: config.auto_resolve_after_lost_ms(),
            cooldown_ms: config.cooldown_ms(),
            ack_snooze_ms: config.ack_snooze_ms(),
        }
    }
}

/// Turns per-track detections into a debounced, hysteretic incident lifecycle.
///
/// There are no background timers. Elapsed-time transitions are evaluated
/// against the caller's clock whenever the track is touched: on each
/// detection, on acknowledgment, and on an explicit [`RadarLifecycle::sweep`].
/// Every deadline is inclusive.
///
/// One instance owns its tracks exclusively; callers serialize access per
/// track and supply a non-decreasing clock.
#[derive(Debug)]
pub struct RadarLifecycle {
    config: RuntimeConfig,
    timings: Timings,
    tracks: AHashMap<TrackId, TrackContact>,
}

impl RadarLifecycle {
    pub fn new(config: RuntimeConfig) -> LifecycleResult<Self> {
        validate_runtime(&config).map_err(|e| LifecycleError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            timings: Timings::from(&config),
            config,
            tracks: AHashMap::new(),
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn track(&self, track_id: &TrackId) -> Option<&TrackContact> {
        self.tracks.get(track_id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track ids in lexical order
    pub fn track_ids(&self) -> Vec<TrackId> {
        let mut ids: Vec<TrackId> = self.tracks.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Apply one detection observed at `now`.
    ///
    /// Timers are first brought up to `now`, so a detection arriving after a
    /// deadline sees the transition the deadline caused. A detection exactly
    /// at the lost-contact deadline keeps a confirmed track in contact.
    pub fn observe_detection(
        &mut self,
        detection: &Detection,
        now: NowMs,
    ) -> LifecycleResult<Vec<LifecycleEvent>> {
        validate_detection(detection)?;

        let timings = self.timings;
        let mut events = Vec::new();
        let contact = self
            .tracks
            .entry(detection.track_id.clone())
            .or_insert_with(|| {
                debug!(target: "astrolabe-radar", "New track '{}'", detection.track_id);
                TrackContact::open(detection.track_id.clone(), now)
            });

        advance_timers(&timings, contact, now, Observed::Detection, &mut events);
        apply_detection(&timings, contact, detection.range_m, now, &mut events);
        Ok(events)
    }

    /// Apply one full scan.
    ///
    /// Detections are applied in frame order. Every track absent from the
    /// frame has its timers evaluated at the frame time, and a debouncing
    /// track absent from the frame has missed a frame.
    pub fn observe_frame(&mut self, frame: &DetectionFrame) -> LifecycleResult<Vec<LifecycleEvent>> {
        let now = frame.observed_at_ms;
        let mut events = Vec::new();
        let mut seen: AHashSet<TrackId> = AHashSet::with_capacity(frame.detections.len());

        // Reject the whole frame before any of it is applied.
        for detection in &frame.detections {
            validate_detection(detection)?;
        }
        for detection in &frame.detections {
            events.extend(self.observe_detection(detection, now)?);
            seen.insert(detection.track_id.clone());
        }

        let timings = self.timings;
        for track_id in self.track_ids() {
            if seen.contains(&track_id) {
                continue;
            }
            if let Some(contact) = self.tracks.get_mut(&track_id) {
                advance_timers(&timings, contact, now, Observed::Elapsed, &mut events);
                if contact.state.is_debouncing() && contact.consecutive_hits > 0 {
                    reset_debounce(contact);
                }
            }
        }
        Ok(events)
    }

    /// Operator acknowledgment: suppress re-alerts for `ack_snooze_s` from `now`.
    ///
    /// Returns transitions that were already due at `now`; they happened
    /// before the acknowledgment and are not suppressed by it.
    pub fn acknowledge(&mut self, track_id: &TrackId, now: NowMs) -> LifecycleResult<Vec<LifecycleEvent>> {
        let timings = self.timings;
        let contact = self
            .tracks
            .get_mut(track_id)
            .ok_or_else(|| LifecycleError::UnknownTrack(track_id.clone()))?;

        let mut events = Vec::new();
        advance_timers(&timings, contact, now, Observed::Elapsed, &mut events);

        let until = now.saturating_add(timings.ack_snooze_ms);
        contact.acked_until = Some(until);
        info!(
            target: "astrolabe-radar",
            "Track '{}' acknowledged until {} ms",
            track_id,
            until
        );
        Ok(events)
    }

    /// Re-evaluate every track's timers at `now`, then drop resolved tracks
    /// whose cooldown has run out.
    pub fn sweep(&mut self, now: NowMs) -> Vec<LifecycleEvent> {
        let timings = self.timings;
        let mut events = Vec::new();

        for track_id in self.track_ids() {
            if let Some(contact) = self.tracks.get_mut(&track_id) {
                advance_timers(&timings, contact, now, Observed::Elapsed, &mut events);
            }
        }

        let before = self.tracks.len();
        self.tracks.retain(|_, contact| !cooldown_elapsed(&timings, contact, now));
        let collected = before - self.tracks.len();
        if collected > 0 {
            debug!(
                target: "astrolabe-radar",
                "Collected {} resolved tracks past cooldown",
                collected
            );
        }
        events
    }
}

fn validate_detection(detection: &Detection) -> LifecycleResult<()> {
    if let Some(range_m) = detection.range_m {
        if !range_m.is_finite() {
            return Err(LifecycleError::InvalidDetection(format!(
                "range_m for track '{}' must be finite",
                detection.track_id
            )));
        }
    }
    detection
        .track_id
        .validate()
        .map_err(|e| LifecycleError::InvalidDetection(e.to_string()))
}

fn elapsed(since: NowMs, now: NowMs) -> u64 {
    now.saturating_sub(since)
}

fn cooldown_elapsed(timings: &Timings, contact: &TrackContact, now: NowMs) -> bool {
    match (contact.state, contact.resolved_at) {
        (ContactState::Resolved, Some(resolved_at)) => {
            elapsed(resolved_at, now) >= timings.cooldown_ms
        }
        _ => false,
    }
}

fn reset_debounce(contact: &mut TrackContact) {
    debug!(
        target: "astrolabe-radar",
        "Track '{}' missed a frame after {} hits",
        contact.track_id,
        contact.consecutive_hits
    );
    contact.consecutive_hits = 0;
    contact.state = ContactState::New;
}

fn emit(
    contact: &TrackContact,
    transition: IncidentTransition,
    at_ms: NowMs,
    now: NowMs,
    events: &mut Vec<LifecycleEvent>,
) {
    let alert_suppressed = contact.is_acknowledged(now);
    info!(
        target: "astrolabe-radar",
        "Track '{}' {} at {} ms (incident {}{})",
        contact.track_id,
        transition,
        at_ms,
        contact.incident_id,
        if alert_suppressed { ", acknowledged" } else { "" }
    );
    events.push(LifecycleEvent {
        track_id: contact.track_id.clone(),
        incident_id: contact.incident_id,
        transition,
        at_ms,
        range_m: contact.last_range_m,
        alert_suppressed,
    });
}

/// What brought the track's timers up to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Observed {
    /// A detection for this track arrives at `now`
    Detection,
    /// Only time has passed
    Elapsed,
}

/// Last instant a LOST track can still be re-acquired. Never earlier than
/// the moment the track was declared lost.
fn resolve_deadline(timings: &Timings, lost_at: NowMs) -> NowMs {
    let declared_lost = lost_at.saturating_add(timings.lost_contact_window_ms);
    lost_at
        .saturating_add(timings.auto_resolve_after_lost_ms)
        .max(declared_lost)
}

/// Apply every elapsed-time transition due at `now`.
fn advance_timers(
    timings: &Timings,
    contact: &mut TrackContact,
    now: NowMs,
    observed: Observed,
    events: &mut Vec<LifecycleEvent>,
) {
    match contact.state {
        ContactState::New | ContactState::Confirming => {
            // A gap wider than the window is a missed frame.
            if contact.consecutive_hits > 0
                && elapsed(contact.last_seen_at, now) > timings.lost_contact_window_ms
            {
                reset_debounce(contact);
            }
            return;
        }
        ContactState::Confirmed => {
            let silence = elapsed(contact.last_seen_at, now);
            let in_contact = match observed {
                Observed::Detection => silence <= timings.lost_contact_window_ms,
                Observed::Elapsed => silence < timings.lost_contact_window_ms,
            };
            if in_contact {
                return;
            }
            contact.state = ContactState::Lost;
            contact.lost_at = Some(contact.last_seen_at);
            let deadline = contact
                .last_seen_at
                .saturating_add(timings.lost_contact_window_ms);
            emit(contact, IncidentTransition::Lost, deadline, now, events);
        }
        ContactState::Lost | ContactState::Resolved => {}
    }

    if contact.state == ContactState::Lost {
        let lost_at = contact.lost_at.unwrap_or(contact.last_seen_at);
        let deadline = resolve_deadline(timings, lost_at);
        if now >= deadline {
            contact.state = ContactState::Resolved;
            contact.resolved_at = Some(deadline);
            emit(contact, IncidentTransition::Resolved, deadline, now, events);
        }
    }
}

/// Count one detection at `now`. Timers must already be advanced to `now`.
fn apply_detection(
    timings: &Timings,
    contact: &mut TrackContact,
    range_m: Option<f64>,
    now: NowMs,
    events: &mut Vec<LifecycleEvent>,
) {
    if range_m.is_some() {
        contact.last_range_m = range_m;
    }

    if contact.state == ContactState::Resolved {
        let resolved_at = contact.resolved_at.unwrap_or(contact.last_seen_at);
        if elapsed(resolved_at, now) < timings.cooldown_ms {
            contact.last_seen_at = now;
            contact.suppressed_reopens = contact.suppressed_reopens.saturating_add(1);
            debug!(
                target: "astrolabe-radar",
                "Track '{}' seen during cooldown; reopen suppressed ({} so far)",
                contact.track_id,
                contact.suppressed_reopens
            );
            return;
        }
        debug!(target: "astrolabe-radar", "Track '{}' reopened", contact.track_id);
        contact.reopen(now);
    }

    contact.consecutive_hits = contact.consecutive_hits.saturating_add(1);
    contact.last_seen_at = now;

    match contact.state {
        ContactState::New | ContactState::Confirming => {
            if contact.consecutive_hits >= timings.confirm_frames {
                contact.state = ContactState::Confirmed;
                contact.confirmed_at = Some(now);
                emit(contact, IncidentTransition::Confirmed, now, now, events);
            } else {
                contact.state = ContactState::Confirming;
            }
        }
        ContactState::Lost => {
            contact.state = ContactState::Confirmed;
            contact.lost_at = None;
            emit(contact, IncidentTransition::Reacquired, now, now, events);
        }
        ContactState::Confirmed | ContactState::Resolved => {}
    }
}
