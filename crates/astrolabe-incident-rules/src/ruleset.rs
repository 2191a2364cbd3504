// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RuleSetLoadError;
use crate::rule::{IncidentObservation, IncidentRule};

pub const SUPPORTED_RULESET_VERSION: u32 = 1;

/// On-disk incident rule source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSetDocument {
    pub version: u32,
    pub rules: Vec<IncidentRule>,
}

#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

/// A validated rule set, ordered by rule id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<IncidentRule>,
}

impl RuleSet {
    pub fn from_json_str(source: &str) -> Result<Self, RuleSetLoadError> {
        let header: VersionHeader =
            serde_json::from_str(source).map_err(|e| RuleSetLoadError::Malformed(e.to_string()))?;
        check_version(header.version)?;

        let document: RuleSetDocument =
            serde_json::from_str(source).map_err(|e| RuleSetLoadError::Malformed(e.to_string()))?;
        Self::from_document(document)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuleSetLoadError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RuleSetLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source)
    }

    pub fn from_document(document: RuleSetDocument) -> Result<Self, RuleSetLoadError> {
        check_version(document.version)?;

        for (index, rule) in document.rules.iter().enumerate() {
            if rule.id.trim().is_empty() {
                return Err(RuleSetLoadError::MissingId(index));
            }
            rule.matcher
                .check()
                .map_err(|reason| RuleSetLoadError::InvalidMatch {
                    rule_id: rule.id.clone(),
                    reason,
                })?;
            if let Some(subsystem_id) = &rule.emit.subsystem_id {
                subsystem_id
                    .validate()
                    .map_err(|e| RuleSetLoadError::InvalidMatch {
                        rule_id: rule.id.clone(),
                        reason: e.to_string(),
                    })?;
            }
        }

        let mut rules = document.rules;
        rules.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(pair) = rules.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(RuleSetLoadError::DuplicateId(pair[0].id.clone()));
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[IncidentRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn position(&self, rule_id: &str) -> Option<usize> {
        self.rules
            .binary_search_by(|rule| rule.id.as_str().cmp(rule_id))
            .ok()
    }

    pub fn get(&self, rule_id: &str) -> Option<&IncidentRule> {
        self.position(rule_id).map(|index| &self.rules[index])
    }

    pub(crate) fn get_mut(&mut self, rule_id: &str) -> Option<&mut IncidentRule> {
        let index = self.position(rule_id)?;
        Some(&mut self.rules[index])
    }

    /// Every rule whose predicate matches, enabled or not, in id order.
    pub fn matching(&self, observation: &IncidentObservation) -> Vec<&IncidentRule> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(observation))
            .collect()
    }

    pub fn enabled_count(&self) -> usize {
        self.rules.iter().filter(|rule| rule.enabled).count()
    }
}

fn check_version(found: u32) -> Result<(), RuleSetLoadError> {
    if found != SUPPORTED_RULESET_VERSION {
        return Err(RuleSetLoadError::UnsupportedVersion {
            found,
            supported: SUPPORTED_RULESET_VERSION,
        });
    }
    Ok(())
}
