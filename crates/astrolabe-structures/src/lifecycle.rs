// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Subsystem lifecycle types: states, events and the authoritative snapshot.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::common_macros::define_entity_id;
use crate::DataError;

define_entity_id!(
    /// Identifies one subsystem instance (e.g. `"eps-1"`, `"thermal-loop-b"`).
    SubsystemId,
    "subsystem_id"
);

/// Free-form event/snapshot payload. Ordered so both encodings emit it identically.
pub type Payload = BTreeMap<String, String>;

/// Lifecycle state of a subsystem.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsmState {
    Idle = 0,
    Active = 1,
    Shutdown = 2,
}

impl FsmState {
    pub const ALL: [FsmState; 3] = [FsmState::Idle, FsmState::Active, FsmState::Shutdown];

    /// Name used by the structured-record encoding.
    pub fn wire_name(&self) -> &'static str {
        match self {
            FsmState::Idle => "IDLE",
            FsmState::Active => "ACTIVE",
            FsmState::Shutdown => "SHUTDOWN",
        }
    }

    pub fn from_wire_name(name: &str) -> Result<Self, DataError> {
        match name {
            "IDLE" => Ok(FsmState::Idle),
            "ACTIVE" => Ok(FsmState::Active),
            "SHUTDOWN" => Ok(FsmState::Shutdown),
            other => Err(DataError::InvalidState(format!(
                "unknown subsystem state '{}'",
                other
            ))),
        }
    }

    /// Code used by the binary-protocol encoding.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FsmState::Shutdown)
    }
}

impl TryFrom<u8> for FsmState {
    type Error = DataError;
    fn try_from(value: u8) -> Result<Self, DataError> {
        match value {
            0 => Ok(FsmState::Idle),
            1 => Ok(FsmState::Active),
            2 => Ok(FsmState::Shutdown),
            _ => Err(DataError::InvalidState(format!(
                "unknown subsystem state code {}",
                value
            ))),
        }
    }
}

impl Display for FsmState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Events the subsystem state machine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FsmEventKind {
    Start,
    Stop,
}

impl FsmEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FsmEventKind::Start => "start",
            FsmEventKind::Stop => "stop",
        }
    }
}

impl Display for FsmEventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A state-machine event addressed to one subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsmEvent {
    pub subsystem_id: SubsystemId,
    pub kind: FsmEventKind,
    pub payload: Payload,
}

impl FsmEvent {
    pub fn new(subsystem_id: impl Into<SubsystemId>, kind: FsmEventKind) -> Self {
        Self {
            subsystem_id: subsystem_id.into(),
            kind,
            payload: Payload::new(),
        }
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// The authoritative state of one subsystem instance.
///
/// Only the FSM engine produces new snapshots; everything else reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub subsystem_id: SubsystemId,
    pub state: FsmState,
    /// Number of transitions applied since creation
    pub version: u64,
    pub payload: Payload,
}

impl Snapshot {
    /// Snapshot created on the first event seen for a subsystem.
    pub fn new(subsystem_id: impl Into<SubsystemId>) -> Self {
        Self {
            subsystem_id: subsystem_id.into(),
            state: FsmState::Idle,
            version: 0,
            payload: Payload::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes_match_wire_names() {
        for state in FsmState::ALL {
            assert_eq!(FsmState::try_from(state.code()).unwrap(), state);
            assert_eq!(FsmState::from_wire_name(state.wire_name()).unwrap(), state);
        }
    }

    #[test]
    fn test_unknown_state_is_invalid_state() {
        assert!(matches!(
            FsmState::try_from(7u8),
            Err(DataError::InvalidState(_))
        ));
        assert!(matches!(
            FsmState::from_wire_name("idle"),
            Err(DataError::InvalidState(_))
        ));
    }

    #[test]
    fn test_new_snapshot_is_idle() {
        let snapshot = Snapshot::new("eps-1");
        assert_eq!(snapshot.state, FsmState::Idle);
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.payload.is_empty());
    }

    #[test]
    fn test_blank_id_rejected() {
        assert!(SubsystemId::new("  ").validate().is_err());
        assert!(SubsystemId::new("eps-1").validate().is_ok());
    }
}
