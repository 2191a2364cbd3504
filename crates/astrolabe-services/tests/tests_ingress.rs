// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The async ingestion boundary end to end over both wire encodings.

mod common;

use std::sync::Arc;

use astrolabe_config::{IngressConfig, IngressEncoding, RuntimeConfig};
use astrolabe_radar::IncidentTransition;
use astrolabe_serialization::{BinaryProtocolCodec, EventCodec, StructuredRecordCodec};
use astrolabe_services::{
    ChannelPublisher, DecisionOutcome, EventIngress, ServiceError, TracingPublisher,
};
use astrolabe_structures::{EventKind, EventTarget, FsmState, InboundEvent, SubsystemId, TrackId};
use common::Fixture;

fn runtime() -> RuntimeConfig {
    RuntimeConfig {
        confirm_frames: 3,
        cooldown_s: 30.0,
        lost_contact_window_s: 2.0,
        auto_resolve_after_lost_s: 5.0,
        ack_snooze_s: 60.0,
    }
}

fn detection(track: &str, at_ms: u64, range_m: &str) -> InboundEvent {
    InboundEvent::new(EventKind::Detection, EventTarget::Track(TrackId::from(track)), at_ms)
        .with_payload("range_m", range_m)
}

#[tokio::test]
async fn test_detections_over_mixed_encodings_confirm_and_start() {
    let fixture = Fixture::new();
    let (publisher, mut reports) = ChannelPublisher::new(16);
    let ingress = EventIngress::spawn(
        &IngressConfig::default(),
        runtime(),
        Arc::clone(&fixture.pipeline),
        Arc::new(publisher),
    )
    .unwrap();

    let json = StructuredRecordCodec::new();
    let binary = BinaryProtocolCodec::new();

    let first = ingress
        .process(&json.encode_event(&detection("DEB-9", 0, "50")).unwrap())
        .await
        .unwrap();
    assert!(first.is_empty());
    ingress
        .process(&binary.encode_event(&detection("DEB-9", 1_000, "48")).unwrap())
        .await
        .unwrap();
    let third = ingress
        .process(&json.encode_event(&detection("DEB-9", 2_000, "46")).unwrap())
        .await
        .unwrap();

    assert_eq!(third.lifecycle_events.len(), 1);
    assert_eq!(third.lifecycle_events[0].transition, IncidentTransition::Confirmed);
    assert!(matches!(
        &third.outcomes[..],
        [DecisionOutcome::Applied { snapshot, .. }] if snapshot.state == FsmState::Active
    ));

    // Only the non-empty report is published.
    let published = reports.recv().await.unwrap();
    assert_eq!(published, third);

    ingress.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_malformed_messages_never_reach_a_shard() {
    let fixture = Fixture::new();
    let ingress = EventIngress::spawn(
        &IngressConfig::default(),
        runtime(),
        Arc::clone(&fixture.pipeline),
        Arc::new(TracingPublisher),
    )
    .unwrap();

    let mismatched =
        br#"{"kind":"detection","subsystem_id":"eps-1","observed_at_ms":0,"payload":{}}"#;
    let both = br#"{"kind":"start","subsystem_id":"a","track_id":"b","observed_at_ms":0}"#;
    let bad_range = br#"{"kind":"detection","track_id":"T-1","observed_at_ms":0,"payload":{"range_m":"far"}}"#;

    for bytes in [&mismatched[..], &both[..], &bad_range[..], &[9u8, 9, 9][..], &[][..]] {
        assert!(
            matches!(ingress.submit(bytes).await, Err(ServiceError::InvalidInput(_))),
            "accepted {:?}",
            bytes
        );
    }
    ingress.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_fixed_encoding_rejects_the_other_one() {
    let fixture = Fixture::new();
    let config = IngressConfig {
        encoding: IngressEncoding::BinaryProtocol,
        ..IngressConfig::default()
    };
    let ingress = EventIngress::spawn(
        &config,
        runtime(),
        Arc::clone(&fixture.pipeline),
        Arc::new(TracingPublisher),
    )
    .unwrap();

    let json = StructuredRecordCodec::new()
        .encode_event(&detection("T-1", 0, "10"))
        .unwrap();
    assert!(ingress.submit(&json).await.is_err());

    let binary = BinaryProtocolCodec::new()
        .encode_event(&detection("T-1", 0, "10"))
        .unwrap();
    ingress.submit(&binary).await.unwrap();
    ingress.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_acknowledging_unknown_track_reports_not_found() {
    let fixture = Fixture::new();
    let ingress = EventIngress::spawn(
        &IngressConfig::default(),
        runtime(),
        Arc::clone(&fixture.pipeline),
        Arc::new(TracingPublisher),
    )
    .unwrap();

    let ack = InboundEvent::new(
        EventKind::Acknowledge,
        EventTarget::Track(TrackId::from("GHOST-1")),
        0,
    );
    let bytes = StructuredRecordCodec::new().encode_event(&ack).unwrap();
    assert!(matches!(
        ingress.process(&bytes).await,
        Err(ServiceError::NotFound { .. })
    ));
    ingress.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_sweep_loses_and_resolves_then_stops_subsystem() {
    let fixture = Fixture::new();
    let ingress = EventIngress::spawn(
        &IngressConfig {
            shards: 2,
            ..IngressConfig::default()
        },
        RuntimeConfig {
            confirm_frames: 1,
            ..runtime()
        },
        Arc::clone(&fixture.pipeline),
        Arc::new(TracingPublisher),
    )
    .unwrap();
    let codec = StructuredRecordCodec::new();

    let confirmed = ingress
        .process(&codec.encode_event(&detection("DEB-1", 0, "50")).unwrap())
        .await
        .unwrap();
    assert_eq!(confirmed.lifecycle_events[0].transition, IncidentTransition::Confirmed);

    let lost = ingress.sweep(3_000).await.unwrap();
    assert_eq!(lost.lifecycle_events.len(), 1);
    assert_eq!(lost.lifecycle_events[0].transition, IncidentTransition::Lost);

    let resolved = ingress.sweep(10_000).await.unwrap();
    assert_eq!(resolved.lifecycle_events[0].transition, IncidentTransition::Resolved);
    assert!(matches!(
        &resolved.outcomes[..],
        [DecisionOutcome::Applied { snapshot, .. }] if snapshot.state == FsmState::Shutdown
    ));

    let snapshot = fixture
        .pipeline
        .registry()
        .get(&SubsystemId::from("collision-avoidance"))
        .unwrap();
    assert_eq!(snapshot.state, FsmState::Shutdown);
    ingress.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_subsystem_commands_route_through_ingress() {
    let fixture = Fixture::new();
    let ingress = EventIngress::spawn(
        &IngressConfig::default(),
        runtime(),
        Arc::clone(&fixture.pipeline),
        Arc::new(TracingPublisher),
    )
    .unwrap();
    let codec = BinaryProtocolCodec::new();
    let eps = EventTarget::Subsystem(SubsystemId::from("eps-1"));

    for (kind, expected) in [
        (EventKind::Start, FsmState::Active),
        (EventKind::Stop, FsmState::Shutdown),
        (EventKind::Stop, FsmState::Shutdown),
    ] {
        let bytes = codec
            .encode_event(&InboundEvent::new(kind, eps.clone(), 0))
            .unwrap();
        let report = ingress.process(&bytes).await.unwrap();
        assert!(matches!(
            &report.outcomes[..],
            [DecisionOutcome::Applied { snapshot, .. }] if snapshot.state == expected
        ));
    }
    ingress.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_same_key_always_routes_to_same_shard() {
    let fixture = Fixture::new();
    let ingress = EventIngress::spawn(
        &IngressConfig {
            shards: 8,
            ..IngressConfig::default()
        },
        runtime(),
        Arc::clone(&fixture.pipeline),
        Arc::new(TracingPublisher),
    )
    .unwrap();

    assert_eq!(ingress.shard_count(), 8);
    let shard = ingress.shard_for("DEB-42");
    for _ in 0..32 {
        assert_eq!(ingress.shard_for("DEB-42"), shard);
    }
    ingress.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_zero_shards_rejected() {
    let fixture = Fixture::new();
    let config = IngressConfig {
        shards: 0,
        ..IngressConfig::default()
    };
    assert!(matches!(
        EventIngress::spawn(&config, runtime(), fixture.pipeline.clone(), Arc::new(TracingPublisher)),
        Err(ServiceError::Load(_))
    ));
}
