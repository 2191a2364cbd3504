// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The abstract inbound event both wire encodings are reduced to.

use std::fmt::{Display, Formatter};

use crate::lifecycle::{FsmEvent, FsmEventKind, Payload, SubsystemId};
use crate::sensor::{NowMs, SensorReading, TrackId};
use crate::DataError;

/// Payload key carrying the measured range of a detection or command.
pub const RANGE_PAYLOAD_KEY: &str = "range_m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    Stop,
    Detection,
    Acknowledge,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Stop => "stop",
            EventKind::Detection => "detection",
            EventKind::Acknowledge => "acknowledge",
        }
    }

    pub fn from_wire_name(name: &str) -> Result<Self, DataError> {
        match name {
            "start" => Ok(EventKind::Start),
            "stop" => Ok(EventKind::Stop),
            "detection" => Ok(EventKind::Detection),
            "acknowledge" => Ok(EventKind::Acknowledge),
            other => Err(DataError::Malformed(format!(
                "unknown event kind '{}'",
                other
            ))),
        }
    }

    /// The state-machine event this kind maps onto, if it is a subsystem command.
    pub fn fsm_kind(&self) -> Option<FsmEventKind> {
        match self {
            EventKind::Start => Some(FsmEventKind::Start),
            EventKind::Stop => Some(FsmEventKind::Stop),
            EventKind::Detection | EventKind::Acknowledge => None,
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which entity an inbound event is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Subsystem(SubsystemId),
    Track(TrackId),
}

impl EventTarget {
    /// Key used to serialize events per entity at the boundary.
    pub fn entity_key(&self) -> &str {
        match self {
            EventTarget::Subsystem(id) => id.as_str(),
            EventTarget::Track(id) => id.as_str(),
        }
    }
}

/// Encoding-independent inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub kind: EventKind,
    pub target: EventTarget,
    pub observed_at_ms: NowMs,
    pub payload: Payload,
}

impl InboundEvent {
    pub fn new(kind: EventKind, target: EventTarget, observed_at_ms: NowMs) -> Self {
        Self {
            kind,
            target,
            observed_at_ms,
            payload: Payload::new(),
        }
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Checks the kind/target pairing and identifiers. Boundary adapters call this
    /// before anything downstream sees the event.
    pub fn validate(&self) -> Result<(), DataError> {
        match (&self.kind, &self.target) {
            (EventKind::Start | EventKind::Stop, EventTarget::Subsystem(id)) => id.validate()?,
            (EventKind::Detection | EventKind::Acknowledge, EventTarget::Track(id)) => {
                id.validate()?
            }
            (kind, EventTarget::Subsystem(_)) => {
                return Err(DataError::BadParameters(format!(
                    "'{}' events must target a track",
                    kind
                )))
            }
            (kind, EventTarget::Track(_)) => {
                return Err(DataError::BadParameters(format!(
                    "'{}' events must target a subsystem",
                    kind
                )))
            }
        }
        self.range_m().map(|_| ())
    }

    /// Parses the optional `range_m` payload entry.
    pub fn range_m(&self) -> Result<Option<f64>, DataError> {
        match self.payload.get(RANGE_PAYLOAD_KEY) {
            None => Ok(None),
            Some(raw) => {
                let value: f64 = raw.trim().parse().map_err(|_| {
                    DataError::BadParameters(format!("range_m '{}' is not a number", raw))
                })?;
                SensorReading::new(value).map(|r| Some(r.range_m))
            }
        }
    }

    /// Reduces a subsystem command to the state-machine event it carries.
    pub fn to_fsm_event(&self) -> Result<FsmEvent, DataError> {
        match (self.kind.fsm_kind(), &self.target) {
            (Some(kind), EventTarget::Subsystem(id)) => Ok(FsmEvent {
                subsystem_id: id.clone(),
                kind,
                payload: self.payload.clone(),
            }),
            _ => Err(DataError::BadParameters(format!(
                "'{}' event is not a subsystem command",
                self.kind
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_maps_to_fsm_event() {
        let event = InboundEvent::new(
            EventKind::Start,
            EventTarget::Subsystem("eps-1".into()),
            10,
        )
        .with_payload("operator", "flight-director");
        let fsm_event = event.to_fsm_event().unwrap();
        assert_eq!(fsm_event.kind, FsmEventKind::Start);
        assert_eq!(fsm_event.subsystem_id.as_str(), "eps-1");
        assert_eq!(fsm_event.payload.get("operator").unwrap(), "flight-director");
    }

    #[test]
    fn test_mismatched_target_rejected() {
        let event = InboundEvent::new(EventKind::Start, EventTarget::Track("T-1".into()), 0);
        assert!(event.validate().is_err());
        let event = InboundEvent::new(
            EventKind::Detection,
            EventTarget::Subsystem("eps-1".into()),
            0,
        );
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_range_payload_parsing() {
        let event = InboundEvent::new(EventKind::Detection, EventTarget::Track("T-1".into()), 0)
            .with_payload(RANGE_PAYLOAD_KEY, "12.5");
        assert_eq!(event.range_m().unwrap(), Some(12.5));
        assert!(event.validate().is_ok());

        let bad = event.clone().with_payload(RANGE_PAYLOAD_KEY, "near");
        assert!(bad.validate().is_err());
        let inf = event.with_payload(RANGE_PAYLOAD_KEY, "inf");
        assert!(inf.range_m().is_err());
    }
}
