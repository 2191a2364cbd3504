// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! JSON structured-record encoding.
//!
//! An event is one object:
//! `{"kind":"detection","track_id":"T-7","observed_at_ms":1200,"payload":{"range_m":"42.0"}}`;
//! subsystem commands carry `"subsystem_id"` instead of `"track_id"`. A snapshot is
//! `{"subsystem_id":"eps-1","state":"ACTIVE","version":1,"payload":{}}`.
//! Unknown fields are rejected.

use serde::{Deserialize, Serialize};

use astrolabe_structures::{
    EventKind, EventTarget, FsmState, InboundEvent, Payload, Snapshot, SubsystemId, TrackId,
};

use crate::{CodecError, EventCodec, WireEncoding};

const ENCODING: WireEncoding = WireEncoding::StructuredRecord;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct EventRecord {
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subsystem_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    track_id: Option<String>,
    observed_at_ms: u64,
    #[serde(default)]
    payload: Payload,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotRecord {
    subsystem_id: String,
    state: String,
    version: u64,
    #[serde(default)]
    payload: Payload,
}

/// Codec for the structured-record (JSON) encoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredRecordCodec;

impl StructuredRecordCodec {
    pub fn new() -> Self {
        Self
    }
}

impl EventCodec for StructuredRecordCodec {
    fn encoding(&self) -> WireEncoding {
        ENCODING
    }

    fn decode_event(&self, bytes: &[u8]) -> Result<InboundEvent, CodecError> {
        let record: EventRecord = serde_json::from_slice(bytes)
            .map_err(|e| CodecError::malformed(ENCODING, e.to_string()))?;

        let kind = EventKind::from_wire_name(&record.kind)
            .map_err(|e| CodecError::from_data(ENCODING, e))?;
        let target = match (record.subsystem_id, record.track_id) {
            (Some(id), None) => EventTarget::Subsystem(SubsystemId::new(id)),
            (None, Some(id)) => EventTarget::Track(TrackId::new(id)),
            (Some(_), Some(_)) => {
                return Err(CodecError::malformed(
                    ENCODING,
                    "record carries both subsystem_id and track_id",
                ))
            }
            (None, None) => {
                return Err(CodecError::malformed(
                    ENCODING,
                    "record carries neither subsystem_id nor track_id",
                ))
            }
        };

        let event = InboundEvent {
            kind,
            target,
            observed_at_ms: record.observed_at_ms,
            payload: record.payload,
        };
        event
            .validate()
            .map_err(|e| CodecError::from_data(ENCODING, e))?;
        Ok(event)
    }

    fn encode_event(&self, event: &InboundEvent) -> Result<Vec<u8>, CodecError> {
        let (subsystem_id, track_id) = match &event.target {
            EventTarget::Subsystem(id) => (Some(id.as_str().to_string()), None),
            EventTarget::Track(id) => (None, Some(id.as_str().to_string())),
        };
        let record = EventRecord {
            kind: event.kind.as_str().to_string(),
            subsystem_id,
            track_id,
            observed_at_ms: event.observed_at_ms,
            payload: event.payload.clone(),
        };
        serde_json::to_vec(&record).map_err(|e| CodecError::Encode {
            encoding: ENCODING,
            reason: e.to_string(),
        })
    }

    fn decode_snapshot(&self, bytes: &[u8]) -> Result<Snapshot, CodecError> {
        let record: SnapshotRecord = serde_json::from_slice(bytes)
            .map_err(|e| CodecError::malformed(ENCODING, e.to_string()))?;
        let state = FsmState::from_wire_name(&record.state)
            .map_err(|e| CodecError::from_data(ENCODING, e))?;
        let subsystem_id = SubsystemId::new(record.subsystem_id);
        subsystem_id
            .validate()
            .map_err(|e| CodecError::from_data(ENCODING, e))?;
        Ok(Snapshot {
            subsystem_id,
            state,
            version: record.version,
            payload: record.payload,
        })
    }

    fn encode_snapshot(&self, snapshot: &Snapshot) -> Result<Vec<u8>, CodecError> {
        let record = SnapshotRecord {
            subsystem_id: snapshot.subsystem_id.as_str().to_string(),
            state: snapshot.state.wire_name().to_string(),
            version: snapshot.version,
            payload: snapshot.payload.clone(),
        };
        serde_json::to_vec(&record).map_err(|e| CodecError::Encode {
            encoding: ENCODING,
            reason: e.to_string(),
        })
    }
}
