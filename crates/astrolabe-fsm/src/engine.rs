// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use astrolabe_serialization::{CodecError, EventCodec};
use astrolabe_structures::{FsmEvent, FsmEventKind, FsmState, Snapshot, SubsystemId};
use tracing::debug;

/// State machine errors. The input snapshot is never modified when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum FsmError {
    /// Snapshot carries a state outside the lifecycle
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The event is not defined for the current state
    #[error("Invalid transition: '{event}' is not defined from {state}")]
    InvalidTransition { state: FsmState, event: FsmEventKind },

    /// The event addresses a different subsystem than the snapshot
    #[error("Event for subsystem '{event}' applied to snapshot of '{snapshot}'")]
    SubsystemMismatch {
        snapshot: SubsystemId,
        event: SubsystemId,
    },

    /// The boundary could not decode or encode a message
    #[error("Codec error: {0}")]
    Codec(CodecError),
}

impl From<CodecError> for FsmError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidState { reason, .. } => FsmError::InvalidState(reason),
            other => FsmError::Codec(other),
        }
    }
}

pub type FsmResult<T> = Result<T, FsmError>;

/// The subsystem transition function.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsmEngine;

impl FsmEngine {
    pub fn new() -> Self {
        Self
    }

    /// Computes the snapshot that results from applying `event` to `snapshot`.
    ///
    /// A SHUTDOWN snapshot is returned unchanged for any event, so repeated
    /// shutdown commands are idempotent.
    ///
    /// # Errors
    /// * `FsmError::SubsystemMismatch` - event addressed to another subsystem
    /// * `FsmError::InvalidTransition` - no edge for `(state, event)`
    pub fn handle(&self, snapshot: &Snapshot, event: &FsmEvent) -> FsmResult<Snapshot> {
        if event.subsystem_id != snapshot.subsystem_id {
            return Err(FsmError::SubsystemMismatch {
                snapshot: snapshot.subsystem_id.clone(),
                event: event.subsystem_id.clone(),
            });
        }

        let next_state = match (snapshot.state, event.kind) {
            (FsmState::Shutdown, _) => {
                debug!(target: "astrolabe-fsm",
                    "'{}' ignored: subsystem {} is already SHUTDOWN", event.kind, snapshot.subsystem_id);
                return Ok(snapshot.clone());
            }
            (FsmState::Idle, FsmEventKind::Start) => FsmState::Active,
            (FsmState::Active, FsmEventKind::Stop) => FsmState::Shutdown,
            (state, kind) => {
                return Err(FsmError::InvalidTransition { state, event: kind });
            }
        };

        let mut next = snapshot.clone();
        next.state = next_state;
        next.version = snapshot.version.saturating_add(1);
        next.payload
            .extend(event.payload.iter().map(|(k, v)| (k.clone(), v.clone())));

        debug!(target: "astrolabe-fsm",
            "{}: {} --{}--> {} (v{})", snapshot.subsystem_id, snapshot.state, event.kind, next.state, next.version);
        Ok(next)
    }

    /// Decodes a snapshot and a subsystem command with `codec`, transitions, and
    /// re-encodes the resulting snapshot with the same codec.
    ///
    /// # Errors
    /// * `FsmError::InvalidState` - the encoded snapshot carries an unknown state
    /// * `FsmError::Codec` - either message is malformed or not a subsystem command
    /// * any error from [`handle`](Self::handle)
    pub fn handle_encoded(
        &self,
        codec: &dyn EventCodec,
        snapshot_bytes: &[u8],
        event_bytes: &[u8],
    ) -> FsmResult<Vec<u8>> {
        let snapshot = codec.decode_snapshot(snapshot_bytes)?;
        let inbound = codec.decode_event(event_bytes)?;
        let event = inbound.to_fsm_event().map_err(|e| {
            FsmError::Codec(CodecError::Malformed {
                encoding: codec.encoding(),
                reason: e.to_string(),
            })
        })?;
        let next = self.handle(&snapshot, &event)?;
        Ok(codec.encode_snapshot(&next)?)
    }
}
