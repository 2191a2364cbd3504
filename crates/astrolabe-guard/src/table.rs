// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use astrolabe_structures::{FsmEventKind, SensorReading};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{GuardResult, GuardTableLoadError};
use crate::rule::{Decision, GuardRule, GuardTableDocument};

/// The only guard-table schema this engine evaluates.
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

/// Caller contract applied on top of the structural checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Reject a table with zero rules
    pub require_non_empty: bool,
}

/// A validated, immutable set of guard rules ordered by `rule_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuardTable {
    rules: Vec<GuardRule>,
}

#[derive(Deserialize)]
struct SchemaHeader {
    schema_version: u32,
}

impl GuardTable {
    /// Table with no rules; every event is allowed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(source: &str, options: LoadOptions) -> GuardResult<Self> {
        // The version decides how the rest of the document is read.
        let header: SchemaHeader = serde_json::from_str(source)
            .map_err(|e| GuardTableLoadError::Malformed(e.to_string()))?;
        check_schema_version(header.schema_version)?;

        let document: GuardTableDocument = serde_json::from_str(source)
            .map_err(|e| GuardTableLoadError::Malformed(e.to_string()))?;
        Self::from_document(document, options)
    }

    pub fn from_file(path: impl AsRef<Path>, options: LoadOptions) -> GuardResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| GuardTableLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&source, options)?;
        info!(
            target: "astrolabe-guard",
            "Loaded guard table from {} ({} rules)",
            path.display(),
            table.len()
        );
        Ok(table)
    }

    /// Validates a parsed document. Fails on the first problem found.
    pub fn from_document(document: GuardTableDocument, options: LoadOptions) -> GuardResult<Self> {
        check_schema_version(document.schema_version)?;

        for (index, rule) in document.rules.iter().enumerate() {
            if rule.rule_id.trim().is_empty() {
                return Err(GuardTableLoadError::BlankRuleId(index));
            }
            if !rule.min_range_m.is_finite() || !rule.max_range_m.is_finite() {
                return Err(GuardTableLoadError::NonFiniteBound(rule.rule_id.clone()));
            }
            if rule.min_range_m > rule.max_range_m {
                return Err(GuardTableLoadError::InvertedRange {
                    rule_id: rule.rule_id.clone(),
                    min: rule.min_range_m,
                    max: rule.max_range_m,
                });
            }
        }

        let mut rules = document.rules;
        rules.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
        if let Some(pair) = rules.windows(2).find(|pair| pair[0].rule_id == pair[1].rule_id) {
            return Err(GuardTableLoadError::DuplicateRuleId(pair[0].rule_id.clone()));
        }

        if options.require_non_empty && rules.is_empty() {
            return Err(GuardTableLoadError::EmptyRuleSet);
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[GuardRule] {
        &self.rules
    }

    pub fn get(&self, rule_id: &str) -> Option<&GuardRule> {
        self.rules
            .binary_search_by(|rule| rule.rule_id.as_str().cmp(rule_id))
            .ok()
            .map(|index| &self.rules[index])
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Decide whether `event` is permitted at the given reading.
    ///
    /// Among the rules for `event` whose closed interval contains the reading,
    /// the highest severity decides (critical escalates, warning denies, info
    /// allows with an advisory). Equal severities go to the narrowest
    /// interval, then to the lexically smallest id. No fired rule allows.
    pub fn evaluate(&self, event: FsmEventKind, reading: &SensorReading) -> Decision {
        let winner = self
            .rules
            .iter()
            .filter(|rule| rule.fsm_event == event && rule.fires(reading))
            .min_by(|a, b| a.precedence(b));

        let decision = match winner {
            Some(rule) => Decision::from_winner(rule),
            None => Decision::allow(),
        };
        debug!(
            target: "astrolabe-guard",
            "Evaluated '{}' at range {} m: {:?}",
            event,
            reading.range_m,
            decision
        );
        decision
    }
}

fn check_schema_version(found: u32) -> GuardResult<()> {
    if found != SUPPORTED_SCHEMA_VERSION {
        return Err(GuardTableLoadError::UnsupportedSchemaVersion {
            found,
            supported: SUPPORTED_SCHEMA_VERSION,
        });
    }
    Ok(())
}
