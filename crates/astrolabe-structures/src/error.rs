// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Common error type for astrolabe data operations.
///
/// Raised when a value crossing into the canonical model is malformed. Errors
/// here never carry partially built values; the caller keeps whatever it had.
///
/// # Examples
/// ```
/// use astrolabe_structures::{DataError, FsmState};
///
/// let err = FsmState::from_wire_name("HIBERNATE").unwrap_err();
/// assert!(matches!(err, DataError::InvalidState(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// Input that cannot be read as a canonical value (unknown kind, bad field type)
    Malformed(String),
    /// A canonical value that an encoding cannot represent
    Unencodable(String),
    /// A well-formed value outside its allowed domain (blank id, negative range)
    BadParameters(String),
    /// A state name or code that is not part of the subsystem lifecycle
    InvalidState(String),
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (what, detail) = match self {
            DataError::Malformed(detail) => ("malformed input", detail),
            DataError::Unencodable(detail) => ("cannot encode", detail),
            DataError::BadParameters(detail) => ("bad parameters", detail),
            DataError::InvalidState(detail) => ("invalid state", detail),
        };
        write!(f, "{}: {}", what, detail)
    }
}

impl Error for DataError {}
