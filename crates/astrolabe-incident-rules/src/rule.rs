// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use astrolabe_radar::{IncidentTransition, LifecycleEvent};
use astrolabe_structures::{FsmEventKind, SubsystemId, TrackId};
use serde::{Deserialize, Deserializer, Serialize};

/// What a rule is matched against: one lifecycle transition of one track.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentObservation {
    pub track_id: TrackId,
    pub transition: IncidentTransition,
    pub range_m: Option<f64>,
}

impl From<&LifecycleEvent> for IncidentObservation {
    fn from(event: &LifecycleEvent) -> Self {
        Self {
            track_id: event.track_id.clone(),
            transition: event.transition,
            range_m: event.range_m,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(IncidentTransition),
    Many(Vec<IncidentTransition>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<IncidentTransition>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(transition) => vec![transition],
        OneOrMany::Many(transitions) => transitions,
    })
}

/// Match predicate. Every present condition must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleMatch {
    /// `"confirmed"` or `["lost", "resolved"]`
    #[serde(rename = "transition", deserialize_with = "one_or_many")]
    pub transitions: Vec<IncidentTransition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_range_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_range_m: Option<f64>,
}

impl RuleMatch {
    pub fn matches(&self, observation: &IncidentObservation) -> bool {
        if !self.transitions.contains(&observation.transition) {
            return false;
        }
        if let Some(prefix) = &self.track_prefix {
            if !observation.track_id.as_str().starts_with(prefix.as_str()) {
                return false;
            }
        }
        if self.min_range_m.is_none() && self.max_range_m.is_none() {
            return true;
        }
        // A range condition cannot hold without a range.
        let Some(range_m) = observation.range_m else {
            return false;
        };
        self.min_range_m.map_or(true, |min| range_m >= min)
            && self.max_range_m.map_or(true, |max| range_m <= max)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.transitions.is_empty() {
            return Err("transition list is empty".to_string());
        }
        for bound in [self.min_range_m, self.max_range_m].into_iter().flatten() {
            if !bound.is_finite() {
                return Err("range bounds must be finite".to_string());
            }
        }
        if let (Some(min), Some(max)) = (self.min_range_m, self.max_range_m) {
            if min > max {
                return Err(format!("min_range_m {} is greater than max_range_m {}", min, max));
            }
        }
        Ok(())
    }
}

/// What a matching enabled rule forwards to the FSM core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEmit {
    /// Target subsystem; the pipeline default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsystem_id: Option<SubsystemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fsm_event: Option<FsmEventKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRule {
    pub id: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "match")]
    pub matcher: RuleMatch,
    #[serde(default)]
    pub emit: RuleEmit,
}

fn enabled_by_default() -> bool {
    true
}

impl IncidentRule {
    pub fn matches(&self, observation: &IncidentObservation) -> bool {
        self.matcher.matches(observation)
    }

    /// FSM event forwarded for `transition`.
    ///
    /// An explicit `emit.fsm_event` always wins. Otherwise confirmation
    /// starts the subsystem and resolution stops it. Loss and re-acquisition
    /// happen inside an incident whose start was already forwarded, so they
    /// forward nothing.
    pub fn forwarded_event(&self, transition: IncidentTransition) -> Option<FsmEventKind> {
        if let Some(event) = self.emit.fsm_event {
            return Some(event);
        }
        match transition {
            IncidentTransition::Confirmed => Some(FsmEventKind::Start),
            IncidentTransition::Resolved => Some(FsmEventKind::Stop),
            IncidentTransition::Lost | IncidentTransition::Reacquired => None,
        }
    }
}
