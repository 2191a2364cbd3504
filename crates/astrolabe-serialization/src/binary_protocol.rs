// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Binary-protocol encoding.
//!
//! # Format
//! - Global header: protocol version (1 byte) + record type (1 byte)
//! - Event body: kind (u8) + target tag (u8) + target id (str) + observed_at_ms (u64) + payload
//! - Snapshot body: subsystem id (str) + state code (u8) + version (u64) + payload
//! - `str`: byte length (u16) + UTF-8 bytes
//! - payload: entry count (u16) + `(str key, str value)` per entry, keys ascending
//!
//! All integers are little-endian. Trailing bytes are an error.

use byteorder::{ByteOrder, LittleEndian};

use astrolabe_structures::{
    EventKind, EventTarget, FsmState, InboundEvent, Payload, Snapshot, SubsystemId, TrackId,
};

use crate::{CodecError, EventCodec, WireEncoding};

const ENCODING: WireEncoding = WireEncoding::BinaryProtocol;

type RecordType = u8;

/// Codec for the binary-protocol encoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryProtocolCodec;

impl BinaryProtocolCodec {
    pub const PROTOCOL_VERSION: u8 = 1;

    pub const GLOBAL_HEADER_BYTE_COUNT: usize = 2; // 1 u8, 1 u8

    pub const RECORD_TYPE_EVENT: RecordType = 1;

    pub const RECORD_TYPE_SNAPSHOT: RecordType = 2;

    pub fn new() -> Self {
        Self
    }

    fn kind_code(kind: EventKind) -> u8 {
        match kind {
            EventKind::Start => 1,
            EventKind::Stop => 2,
            EventKind::Detection => 3,
            EventKind::Acknowledge => 4,
        }
    }

    fn kind_from_code(code: u8) -> Result<EventKind, CodecError> {
        match code {
            1 => Ok(EventKind::Start),
            2 => Ok(EventKind::Stop),
            3 => Ok(EventKind::Detection),
            4 => Ok(EventKind::Acknowledge),
            _ => Err(CodecError::malformed(
                ENCODING,
                format!("unknown event kind code {}", code),
            )),
        }
    }

    fn read_header(reader: &mut ByteReader<'_>, expected: RecordType) -> Result<(), CodecError> {
        let version = reader.read_u8()?;
        if version != Self::PROTOCOL_VERSION {
            return Err(CodecError::malformed(
                ENCODING,
                format!(
                    "unsupported protocol version {} (expected {})",
                    version,
                    Self::PROTOCOL_VERSION
                ),
            ));
        }
        let record_type = reader.read_u8()?;
        if record_type != expected {
            return Err(CodecError::malformed(
                ENCODING,
                format!("record type {} where {} was expected", record_type, expected),
            ));
        }
        Ok(())
    }
}

impl EventCodec for BinaryProtocolCodec {
    fn encoding(&self) -> WireEncoding {
        ENCODING
    }

    fn decode_event(&self, bytes: &[u8]) -> Result<InboundEvent, CodecError> {
        let mut reader = ByteReader::new(bytes);
        Self::read_header(&mut reader, Self::RECORD_TYPE_EVENT)?;

        let kind = Self::kind_from_code(reader.read_u8()?)?;
        let target_tag = reader.read_u8()?;
        let target_id = reader.read_str()?;
        let target = match target_tag {
            1 => EventTarget::Subsystem(SubsystemId::new(target_id)),
            2 => EventTarget::Track(TrackId::new(target_id)),
            other => {
                return Err(CodecError::malformed(
                    ENCODING,
                    format!("unknown target tag {}", other),
                ))
            }
        };
        let observed_at_ms = reader.read_u64()?;
        let payload = reader.read_payload()?;
        reader.finish()?;

        let event = InboundEvent {
            kind,
            target,
            observed_at_ms,
            payload,
        };
        event
            .validate()
            .map_err(|e| CodecError::from_data(ENCODING, e))?;
        Ok(event)
    }

    fn encode_event(&self, event: &InboundEvent) -> Result<Vec<u8>, CodecError> {
        let mut writer = ByteWriter::with_header(Self::RECORD_TYPE_EVENT);
        writer.put_u8(Self::kind_code(event.kind));
        match &event.target {
            EventTarget::Subsystem(id) => {
                writer.put_u8(1);
                writer.put_str(id.as_str())?;
            }
            EventTarget::Track(id) => {
                writer.put_u8(2);
                writer.put_str(id.as_str())?;
            }
        }
        writer.put_u64(event.observed_at_ms);
        writer.put_payload(&event.payload)?;
        Ok(writer.into_bytes())
    }

    fn decode_snapshot(&self, bytes: &[u8]) -> Result<Snapshot, CodecError> {
        let mut reader = ByteReader::new(bytes);
        Self::read_header(&mut reader, Self::RECORD_TYPE_SNAPSHOT)?;

        let subsystem_id = SubsystemId::new(reader.read_str()?);
        subsystem_id
            .validate()
            .map_err(|e| CodecError::from_data(ENCODING, e))?;
        let state =
            FsmState::try_from(reader.read_u8()?).map_err(|e| CodecError::from_data(ENCODING, e))?;
        let version = reader.read_u64()?;
        let payload = reader.read_payload()?;
        reader.finish()?;

        Ok(Snapshot {
            subsystem_id,
            state,
            version,
            payload,
        })
    }

    fn encode_snapshot(&self, snapshot: &Snapshot) -> Result<Vec<u8>, CodecError> {
        let mut writer = ByteWriter::with_header(Self::RECORD_TYPE_SNAPSHOT);
        writer.put_str(snapshot.subsystem_id.as_str())?;
        writer.put_u8(snapshot.state.code());
        writer.put_u64(snapshot.version);
        writer.put_payload(&snapshot.payload)?;
        Ok(writer.into_bytes())
    }
}

//region Byte Cursor

struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], CodecError> {
        let end = self.position.checked_add(count).filter(|end| *end <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.position..end];
                self.position = end;
                Ok(slice)
            }
            None => Err(CodecError::malformed(
                ENCODING,
                format!(
                    "truncated message: needed {} bytes at offset {}, {} available",
                    count,
                    self.position,
                    self.bytes.len().saturating_sub(self.position)
                ),
            )),
        }
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    fn read_str(&mut self) -> Result<String, CodecError> {
        let length = self.read_u16()? as usize;
        let raw = self.take(length)?;
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|e| CodecError::malformed(ENCODING, format!("invalid UTF-8: {}", e)))
    }

    fn read_payload(&mut self) -> Result<Payload, CodecError> {
        let count = self.read_u16()?;
        let mut payload = Payload::new();
        for _ in 0..count {
            let key = self.read_str()?;
            let value = self.read_str()?;
            if payload.insert(key.clone(), value).is_some() {
                return Err(CodecError::malformed(
                    ENCODING,
                    format!("duplicate payload key '{}'", key),
                ));
            }
        }
        Ok(payload)
    }

    fn finish(&self) -> Result<(), CodecError> {
        if self.position != self.bytes.len() {
            return Err(CodecError::malformed(
                ENCODING,
                format!(
                    "{} trailing bytes after record",
                    self.bytes.len() - self.position
                ),
            ));
        }
        Ok(())
    }
}

struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    fn with_header(record_type: RecordType) -> Self {
        let mut bytes = Vec::with_capacity(64);
        bytes.push(BinaryProtocolCodec::PROTOCOL_VERSION);
        bytes.push(record_type);
        Self { bytes }
    }

    fn put_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    fn put_u16(&mut self, value: u16) {
        let mut buffer = [0u8; 2];
        LittleEndian::write_u16(&mut buffer, value);
        self.bytes.extend_from_slice(&buffer);
    }

    fn put_u64(&mut self, value: u64) {
        let mut buffer = [0u8; 8];
        LittleEndian::write_u64(&mut buffer, value);
        self.bytes.extend_from_slice(&buffer);
    }

    fn put_str(&mut self, value: &str) -> Result<(), CodecError> {
        let length = u16::try_from(value.len()).map_err(|_| CodecError::Encode {
            encoding: ENCODING,
            reason: format!("string of {} bytes exceeds u16 length prefix", value.len()),
        })?;
        self.put_u16(length);
        self.bytes.extend_from_slice(value.as_bytes());
        Ok(())
    }

    fn put_payload(&mut self, payload: &Payload) -> Result<(), CodecError> {
        let count = u16::try_from(payload.len()).map_err(|_| CodecError::Encode {
            encoding: ENCODING,
            reason: format!("payload of {} entries exceeds u16 count", payload.len()),
        })?;
        self.put_u16(count);
        for (key, value) in payload {
            self.put_str(key)?;
            self.put_str(value)?;
        }
        Ok(())
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

//endregion

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_header_layout() {
        let codec = BinaryProtocolCodec::new();
        let event = InboundEvent::new(
            EventKind::Start,
            EventTarget::Subsystem("eps".into()),
            0x0102,
        );
        let bytes = codec.encode_event(&event).unwrap();
        assert_eq!(bytes[0], BinaryProtocolCodec::PROTOCOL_VERSION);
        assert_eq!(bytes[1], BinaryProtocolCodec::RECORD_TYPE_EVENT);
        assert_eq!(bytes[2], 1); // start
        assert_eq!(bytes[3], 1); // subsystem target
        assert_eq!(&bytes[4..6], &[3, 0]); // id length
        assert_eq!(&bytes[6..9], b"eps");
        assert_eq!(&bytes[9..17], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[17..19], &[0, 0]); // empty payload
        assert_eq!(bytes.len(), 19);
    }

    #[test]
    fn test_truncated_and_trailing_rejected() {
        let codec = BinaryProtocolCodec::new();
        let event = InboundEvent::new(EventKind::Detection, EventTarget::Track("T-1".into()), 5)
            .with_payload("range_m", "3.5");
        let bytes = codec.encode_event(&event).unwrap();

        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(codec.decode_event(truncated), Err(CodecError::Malformed { .. })));

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(matches!(codec.decode_event(&trailing), Err(CodecError::Malformed { .. })));

        assert_eq!(codec.decode_event(&bytes).unwrap(), event);
    }

    #[test]
    fn test_unknown_state_code_is_invalid_state() {
        let codec = BinaryProtocolCodec::new();
        let mut bytes = codec.encode_snapshot(&Snapshot::new("eps")).unwrap();
        // header(2) + len(2) + "eps"(3) => state code at offset 7
        bytes[7] = 9;
        assert!(matches!(
            codec.decode_snapshot(&bytes),
            Err(CodecError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_record_type_mismatch_rejected() {
        let codec = BinaryProtocolCodec::new();
        let snapshot_bytes = codec.encode_snapshot(&Snapshot::new("eps")).unwrap();
        assert!(codec.decode_event(&snapshot_bytes).is_err());
    }

    #[test]
    fn test_kind_target_mismatch_rejected() {
        let codec = BinaryProtocolCodec::new();
        // detection addressed to a subsystem
        let bytes = [1u8, 1, 3, 1, 1, 0, b'x', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(codec.decode_event(&bytes), Err(CodecError::Malformed { .. })));
    }
}
