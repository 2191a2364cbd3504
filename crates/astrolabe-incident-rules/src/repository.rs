// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::audit::{AuditEntry, AuditSink};
use crate::error::{RepositoryError, RuleSetLoadError};
use crate::ruleset::RuleSet;

/// Shared home of the operator-editable incident rules.
///
/// Readers take the current [`RuleSet`] snapshot and never wait on audit I/O.
/// Changes go through one writer at a time: the candidate set is built, its
/// audit entry is made durable, and only then is the candidate published.
pub struct IncidentRuleRepository {
    current: RwLock<Arc<RuleSet>>,
    writer: Mutex<()>,
    audit: Arc<dyn AuditSink>,
}

impl IncidentRuleRepository {
    pub fn load(
        rules_path: impl AsRef<Path>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, RuleSetLoadError> {
        let rules_path = rules_path.as_ref();
        let rules = RuleSet::from_file(rules_path)?;
        info!(
            target: "astrolabe-incident-rules",
            "Loaded {} incident rules ({} enabled) from {}",
            rules.len(),
            rules.enabled_count(),
            rules_path.display()
        );
        Ok(Self::new(rules, audit))
    }

    pub fn new(rules: RuleSet, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            current: RwLock::new(Arc::new(rules)),
            writer: Mutex::new(()),
            audit,
        }
    }

    /// The current rule set
    pub fn rules(&self) -> Arc<RuleSet> {
        Arc::clone(&self.current.read())
    }

    /// Enable or disable one rule on behalf of `source`.
    ///
    /// Exactly one audit entry is written per call, including calls that set
    /// the value the rule already has. If the entry cannot be made durable
    /// the change is not published and `AuditWrite` is returned.
    pub fn set_enabled(
        &self,
        rule_id: &str,
        enabled: bool,
        source: &str,
    ) -> Result<AuditEntry, RepositoryError> {
        if source.trim().is_empty() {
            return Err(RepositoryError::BlankSource);
        }

        let _writer = self.writer.lock();

        let mut candidate = RuleSet::clone(&self.rules());
        let rule = candidate
            .get_mut(rule_id)
            .ok_or_else(|| RepositoryError::UnknownRule(rule_id.to_string()))?;
        let old_enabled = rule.enabled;
        rule.enabled = enabled;

        let entry = AuditEntry {
            timestamp: Utc::now(),
            source: source.to_string(),
            rule_id: rule_id.to_string(),
            old_enabled,
            new_enabled: enabled,
        };

        if let Err(err) = self.audit.append(&entry) {
            warn!(
                target: "astrolabe-incident-rules",
                "Rule '{}' left {} after audit failure",
                rule_id,
                if old_enabled { "enabled" } else { "disabled" }
            );
            return Err(RepositoryError::AuditWrite(err));
        }

        *self.current.write() = Arc::new(candidate);
        info!(
            target: "astrolabe-incident-rules",
            "Rule '{}' {} -> {} by {}",
            rule_id,
            old_enabled,
            enabled,
            source
        );
        Ok(entry)
    }
}
