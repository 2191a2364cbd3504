// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Astrolabe Wire Serialization
//!
//! This crate translates the two external wire encodings to and from the canonical
//! model in `astrolabe-structures`. Both encodings implement the [`EventCodec`]
//! trait; everything downstream depends on the trait only.
//!
//! ## Core Components
//!
//! - **[`EventCodec`]** - decode/encode contract shared by both encodings
//! - **[`StructuredRecordCodec`]** - JSON record encoding
//! - **[`BinaryProtocolCodec`]** - little-endian framed binary encoding
//! - **[`WireEncoding`]** - enum identifying an encoding, with leading-byte detection
//!
//! ## Field correspondence
//!
//! | Canonical | Structured record | Binary protocol |
//! |---|---|---|
//! | `InboundEvent.kind` | `"kind"`: `start` `stop` `detection` `acknowledge` | u8 `1` `2` `3` `4` |
//! | `EventTarget::Subsystem` | `"subsystem_id"` | tag u8 `1` + str |
//! | `EventTarget::Track` | `"track_id"` | tag u8 `2` + str |
//! | `observed_at_ms` | `"observed_at_ms"` | u64 |
//! | `Snapshot.state` | `"state"`: `IDLE` `ACTIVE` `SHUTDOWN` | u8 `0` `1` `2` |
//! | `Snapshot.version` | `"version"` | u64 |
//! | `payload` | `"payload"` object of strings | u16 count + str pairs |
//!
//! ## Basic Usage
//!
//! ```rust
//! use astrolabe_serialization::{EventCodec, WireEncoding};
//! use astrolabe_structures::{EventKind, EventTarget, InboundEvent};
//!
//! let event = InboundEvent::new(EventKind::Start, EventTarget::Subsystem("eps-1".into()), 0);
//! for encoding in [WireEncoding::StructuredRecord, WireEncoding::BinaryProtocol] {
//!     let codec = encoding.codec();
//!     let bytes = codec.encode_event(&event).unwrap();
//!     assert_eq!(WireEncoding::detect(&bytes).unwrap(), encoding);
//!     assert_eq!(codec.decode_event(&bytes).unwrap(), event);
//! }
//! ```

mod binary_protocol;
mod event_codec;
mod structured_record;

pub use binary_protocol::BinaryProtocolCodec;
pub use event_codec::{CodecError, EventCodec, WireEncoding};
pub use structured_record::StructuredRecordCodec;
