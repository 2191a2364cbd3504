// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Properties of the subsystem state machine that must hold for every input.

use astrolabe_fsm::{FsmEngine, FsmError};
use astrolabe_serialization::{BinaryProtocolCodec, EventCodec, StructuredRecordCodec};
use astrolabe_structures::{
    EventKind, EventTarget, FsmEvent, FsmEventKind, FsmState, InboundEvent, Snapshot,
};
use proptest::prelude::*;

fn arb_kind() -> impl Strategy<Value = FsmEventKind> {
    prop_oneof![Just(FsmEventKind::Start), Just(FsmEventKind::Stop)]
}

fn to_inbound(kind: FsmEventKind, at: u64) -> InboundEvent {
    let kind = match kind {
        FsmEventKind::Start => EventKind::Start,
        FsmEventKind::Stop => EventKind::Stop,
    };
    InboundEvent::new(kind, EventTarget::Subsystem("eps-1".into()), at)
}

/// Applies a sequence through one codec, keeping the last accepted snapshot.
fn run_encoded(codec: &dyn EventCodec, kinds: &[FsmEventKind]) -> Snapshot {
    let engine = FsmEngine::new();
    let mut snapshot_bytes = codec.encode_snapshot(&Snapshot::new("eps-1")).unwrap();
    for (at, kind) in kinds.iter().enumerate() {
        let event_bytes = codec.encode_event(&to_inbound(*kind, at as u64)).unwrap();
        match engine.handle_encoded(codec, &snapshot_bytes, &event_bytes) {
            Ok(next) => snapshot_bytes = next,
            Err(FsmError::InvalidTransition { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    codec.decode_snapshot(&snapshot_bytes).unwrap()
}

proptest! {
    #[test]
    fn shutdown_absorbs_every_event(kind in arb_kind(), version in any::<u64>()) {
        let engine = FsmEngine::new();
        let mut snapshot = Snapshot::new("eps-1");
        snapshot.state = FsmState::Shutdown;
        snapshot.version = version;
        let event = FsmEvent::new("eps-1", kind).with_payload("note", "late");
        prop_assert_eq!(engine.handle(&snapshot, &event).unwrap(), snapshot);
    }

    #[test]
    fn both_encodings_reach_the_same_state(kinds in prop::collection::vec(arb_kind(), 0..12)) {
        let from_structured = run_encoded(&StructuredRecordCodec::new(), &kinds);
        let from_binary = run_encoded(&BinaryProtocolCodec::new(), &kinds);
        prop_assert_eq!(from_structured, from_binary);
    }
}

#[test]
fn test_unknown_encoded_state_is_invalid_state() {
    let engine = FsmEngine::new();
    let codec = StructuredRecordCodec::new();
    let snapshot = br#"{"subsystem_id":"eps-1","state":"STANDBY","version":0}"#;
    let event = codec.encode_event(&to_inbound(FsmEventKind::Start, 0)).unwrap();
    assert!(matches!(
        engine.handle_encoded(&codec, snapshot, &event),
        Err(FsmError::InvalidState(_))
    ));
}

#[test]
fn test_detection_is_not_a_subsystem_command() {
    let engine = FsmEngine::new();
    let codec = BinaryProtocolCodec::new();
    let snapshot = codec.encode_snapshot(&Snapshot::new("eps-1")).unwrap();
    let detection = codec
        .encode_event(&InboundEvent::new(
            EventKind::Detection,
            EventTarget::Track("T-1".into()),
            0,
        ))
        .unwrap();
    assert!(matches!(
        engine.handle_encoded(&codec, &snapshot, &detection),
        Err(FsmError::Codec(_))
    ));
}
