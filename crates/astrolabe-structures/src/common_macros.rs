// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Defines a string-backed entity identifier.
///
/// Identifiers are opaque to the core; the only rule is that they are not blank,
/// which the boundary adapters check through `validate`.
macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn validate(&self) -> Result<(), crate::DataError> {
                if self.0.trim().is_empty() {
                    return Err(crate::DataError::BadParameters(format!(
                        "{} must not be blank",
                        $label
                    )));
                }
                Ok(())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

pub(crate) use define_entity_id;
