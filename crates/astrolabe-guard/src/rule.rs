// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;

use astrolabe_structures::{FsmEventKind, SensorReading, Severity};
use serde::{Deserialize, Serialize};

/// One range-bounded safety rule. Immutable once its table is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardRule {
    pub rule_id: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    /// The proposed transition this rule applies to
    pub fsm_event: FsmEventKind,
    pub min_range_m: f64,
    pub max_range_m: f64,
}

impl GuardRule {
    /// Closed-interval test: both bounds are inside.
    pub fn fires(&self, reading: &SensorReading) -> bool {
        reading.range_m >= self.min_range_m && reading.range_m <= self.max_range_m
    }

    pub fn interval_width(&self) -> f64 {
        self.max_range_m - self.min_range_m
    }

    /// Precedence among fired rules: `Less` means `self` wins.
    ///
    /// Highest severity first, then the narrowest interval, then lexical id.
    pub(crate) fn precedence(&self, other: &GuardRule) -> Ordering {
        other
            .severity
            .cmp(&self.severity)
            .then_with(|| self.interval_width().total_cmp(&other.interval_width()))
            .then_with(|| self.rule_id.cmp(&other.rule_id))
    }
}

/// On-disk guard-table source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardTableDocument {
    pub schema_version: u32,
    pub rules: Vec<GuardRule>,
}

/// Result of gating a proposed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Permitted. `advisory` names the info-severity rule that fired, if any.
    Allow { advisory: Option<String> },
    Deny { rule_id: String },
    /// Vetoed and surfaced for operator attention
    Escalate { rule_id: String, severity: Severity },
}

impl Decision {
    pub fn allow() -> Self {
        Decision::Allow { advisory: None }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    /// The rule that determined this decision
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            Decision::Allow { advisory } => advisory.as_deref(),
            Decision::Deny { rule_id } | Decision::Escalate { rule_id, .. } => Some(rule_id),
        }
    }

    pub(crate) fn from_winner(rule: &GuardRule) -> Self {
        match rule.severity {
            Severity::Critical => Decision::Escalate {
                rule_id: rule.rule_id.clone(),
                severity: rule.severity,
            },
            Severity::Warning => Decision::Deny {
                rule_id: rule.rule_id.clone(),
            },
            Severity::Info => Decision::Allow {
                advisory: Some(rule.rule_id.clone()),
            },
        }
    }
}
