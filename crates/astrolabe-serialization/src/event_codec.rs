// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};

use astrolabe_structures::{DataError, InboundEvent, Snapshot};

use crate::{BinaryProtocolCodec, StructuredRecordCodec};

/// The two external encodings an event or snapshot may arrive in.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum WireEncoding {
    /// JSON record, one object per message
    StructuredRecord,
    /// Little-endian framed binary protocol
    BinaryProtocol,
}

impl WireEncoding {
    /// Determines the encoding of a message from its leading byte.
    ///
    /// # Example
    /// ```
    /// use astrolabe_serialization::WireEncoding;
    ///
    /// assert_eq!(
    ///     WireEncoding::detect(br#" {"kind":"start"}"#).unwrap(),
    ///     WireEncoding::StructuredRecord
    /// );
    /// assert_eq!(WireEncoding::detect(&[1u8, 1]).unwrap(), WireEncoding::BinaryProtocol);
    /// assert!(WireEncoding::detect(&[]).is_err());
    /// ```
    pub fn detect(bytes: &[u8]) -> Result<WireEncoding, CodecError> {
        if bytes.first() == Some(&BinaryProtocolCodec::PROTOCOL_VERSION) {
            return Ok(WireEncoding::BinaryProtocol);
        }
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(&b'{') => Ok(WireEncoding::StructuredRecord),
            Some(b) => Err(CodecError::UnknownEncoding(format!(
                "leading byte {:#04x} matches no supported encoding",
                b
            ))),
            None => Err(CodecError::UnknownEncoding(
                "cannot ascertain encoding of an empty message".into(),
            )),
        }
    }

    /// Creates the codec implementing this encoding.
    pub fn codec(&self) -> Box<dyn EventCodec> {
        match self {
            WireEncoding::StructuredRecord => Box::new(StructuredRecordCodec::new()),
            WireEncoding::BinaryProtocol => Box::new(BinaryProtocolCodec::new()),
        }
    }
}

impl Display for WireEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WireEncoding::StructuredRecord => "structured-record",
            WireEncoding::BinaryProtocol => "binary-protocol",
        };
        write!(f, "{name}")
    }
}

/// Boundary codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Malformed {encoding} message: {reason}")]
    Malformed {
        encoding: WireEncoding,
        reason: String,
    },

    #[error("Invalid state in {encoding} message: {reason}")]
    InvalidState {
        encoding: WireEncoding,
        reason: String,
    },

    #[error("Failed to encode {encoding} message: {reason}")]
    Encode {
        encoding: WireEncoding,
        reason: String,
    },

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),
}

impl CodecError {
    /// Lifts a canonical-model error into this encoding's error space.
    pub(crate) fn from_data(encoding: WireEncoding, err: DataError) -> Self {
        match err {
            DataError::InvalidState(reason) => CodecError::InvalidState { encoding, reason },
            DataError::Unencodable(reason) => CodecError::Encode { encoding, reason },
            other => CodecError::Malformed {
                encoding,
                reason: other.to_string(),
            },
        }
    }

    pub(crate) fn malformed(encoding: WireEncoding, reason: impl Into<String>) -> Self {
        CodecError::Malformed {
            encoding,
            reason: reason.into(),
        }
    }
}

/// Translation between one wire encoding and the canonical model.
///
/// Implementations are pure and lossless: `decode(encode(x)) == x` for every
/// valid `x`, and decoders reject anything the canonical model cannot hold.
pub trait EventCodec: Send + Sync {
    fn encoding(&self) -> WireEncoding;

    fn decode_event(&self, bytes: &[u8]) -> Result<InboundEvent, CodecError>;

    fn encode_event(&self, event: &InboundEvent) -> Result<Vec<u8>, CodecError>;

    fn decode_snapshot(&self, bytes: &[u8]) -> Result<Snapshot, CodecError>;

    fn encode_snapshot(&self, snapshot: &Snapshot) -> Result<Vec<u8>, CodecError>;
}
