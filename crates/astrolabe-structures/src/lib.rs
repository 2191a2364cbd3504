// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The core crate for astrolabe. Defines the canonical data model every stage of
//! the decision path agrees on:
//!
//! - [`Snapshot`] / [`FsmState`] / [`FsmEvent`] - subsystem lifecycle
//! - [`TrackId`] / [`SensorReading`] / [`Severity`] - sensor side
//! - [`InboundEvent`] - what either wire encoding is reduced to
//!
//! Exactly one canonical representation exists; the wire encodings in
//! `astrolabe-serialization` translate to and from these types.

mod common_macros;
mod error;
mod inbound;
mod lifecycle;
mod sensor;

pub use error::DataError;
pub use inbound::{EventKind, EventTarget, InboundEvent, RANGE_PAYLOAD_KEY};
pub use lifecycle::{FsmEvent, FsmEventKind, FsmState, Payload, Snapshot, SubsystemId};
pub use sensor::{seconds_to_ms, NowMs, SensorReading, Severity, TrackId};
