// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Service layer error types.

Every component error of the decision path folds into [`ServiceError`] so
boundary adapters handle a single type.
*/

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    /// Malformed or mismatched input, rejected before any core code ran
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {resource} with id '{id}'")]
    NotFound { resource: String, id: String },

    /// Subsystem snapshot carries an unrecognized state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Startup configuration or rule source could not be loaded
    #[error("Load error: {0}")]
    Load(String),

    /// A durability failure aborted the change it protected
    #[error("Audit write failed: {0}")]
    AuditWrite(String),

    /// The ingress or a downstream channel is no longer running
    #[error("Closed: {0}")]
    Closed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// ============================================================================
// ERROR CONVERSIONS FROM COMPONENTS
// ============================================================================

impl From<astrolabe_structures::DataError> for ServiceError {
    fn from(err: astrolabe_structures::DataError) -> Self {
        match err {
            astrolabe_structures::DataError::InvalidState(msg) => ServiceError::InvalidState(msg),
            other => ServiceError::InvalidInput(other.to_string()),
        }
    }
}

impl From<astrolabe_serialization::CodecError> for ServiceError {
    fn from(err: astrolabe_serialization::CodecError) -> Self {
        match err {
            astrolabe_serialization::CodecError::InvalidState { .. } => {
                ServiceError::InvalidState(err.to_string())
            }
            _ => ServiceError::InvalidInput(err.to_string()),
        }
    }
}

impl From<astrolabe_fsm::FsmError> for ServiceError {
    fn from(err: astrolabe_fsm::FsmError) -> Self {
        match err {
            astrolabe_fsm::FsmError::InvalidState(msg) => ServiceError::InvalidState(msg),
            astrolabe_fsm::FsmError::Codec(codec) => codec.into(),
            other => ServiceError::InvalidInput(other.to_string()),
        }
    }
}

impl From<astrolabe_guard::GuardTableLoadError> for ServiceError {
    fn from(err: astrolabe_guard::GuardTableLoadError) -> Self {
        ServiceError::Load(err.to_string())
    }
}

impl From<astrolabe_incident_rules::RuleSetLoadError> for ServiceError {
    fn from(err: astrolabe_incident_rules::RuleSetLoadError) -> Self {
        ServiceError::Load(err.to_string())
    }
}

impl From<astrolabe_incident_rules::AuditError> for ServiceError {
    fn from(err: astrolabe_incident_rules::AuditError) -> Self {
        ServiceError::AuditWrite(err.to_string())
    }
}

impl From<astrolabe_incident_rules::RepositoryError> for ServiceError {
    fn from(err: astrolabe_incident_rules::RepositoryError) -> Self {
        match err {
            astrolabe_incident_rules::RepositoryError::UnknownRule(id) => ServiceError::NotFound {
                resource: "IncidentRule".to_string(),
                id,
            },
            astrolabe_incident_rules::RepositoryError::AuditWrite(audit) => audit.into(),
            other => ServiceError::InvalidInput(other.to_string()),
        }
    }
}

impl From<astrolabe_radar::LifecycleError> for ServiceError {
    fn from(err: astrolabe_radar::LifecycleError) -> Self {
        match err {
            astrolabe_radar::LifecycleError::UnknownTrack(id) => ServiceError::NotFound {
                resource: "Track".to_string(),
                id: id.to_string(),
            },
            astrolabe_radar::LifecycleError::InvalidConfig(msg) => ServiceError::Load(msg),
            other => ServiceError::InvalidInput(other.to_string()),
        }
    }
}

impl From<astrolabe_config::ConfigError> for ServiceError {
    fn from(err: astrolabe_config::ConfigError) -> Self {
        ServiceError::Load(err.to_string())
    }
}

impl From<astrolabe_state_manager::StateError> for ServiceError {
    fn from(err: astrolabe_state_manager::StateError) -> Self {
        ServiceError::Load(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrolabe_incident_rules::RepositoryError;
    use astrolabe_radar::LifecycleError;
    use astrolabe_structures::TrackId;

    #[test]
    fn test_unknown_entities_map_to_not_found() {
        let rule: ServiceError = RepositoryError::UnknownRule("r9".to_string()).into();
        assert!(matches!(rule, ServiceError::NotFound { ref id, .. } if id == "r9"));

        let track: ServiceError = LifecycleError::UnknownTrack(TrackId::from("T-1")).into();
        assert!(matches!(track, ServiceError::NotFound { ref resource, .. } if resource == "Track"));
    }

    #[test]
    fn test_invalid_state_is_preserved() {
        let err: ServiceError =
            astrolabe_fsm::FsmError::InvalidState("unknown subsystem state 'X'".to_string()).into();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }
}
