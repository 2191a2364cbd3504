// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # astrolabe-incident-rules
//!
//! The operator-editable rules deciding which radar lifecycle transitions
//! drive subsystem state changes, and the durable audit trail of every
//! enable/disable change made to them.

mod audit;
mod error;
mod repository;
mod rule;
mod ruleset;

pub use audit::{read_history, AuditEntry, AuditSink, JsonlAuditLog};
pub use error::{AuditError, RepositoryError, RuleSetLoadError};
pub use repository::IncidentRuleRepository;
pub use rule::{IncidentObservation, IncidentRule, RuleEmit, RuleMatch};
pub use ruleset::{RuleSet, RuleSetDocument, SUPPORTED_RULESET_VERSION};
