// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The decision path from a lifecycle transition (or a direct subsystem command)
to an applied, denied or escalated FSM transition:

```text
LifecycleEvent ──▶ incident rules ──▶ guard table ──▶ FSM engine ──▶ snapshot registry
                    (enabled?)        (range gate)     (transition)
```
*/

use std::sync::Arc;

use astrolabe_config::AstrolabeConfig;
use astrolabe_fsm::FsmEngine;
use astrolabe_guard::{Decision, GuardTableHandle, LoadOptions};
use astrolabe_incident_rules::{
    IncidentObservation, IncidentRule, IncidentRuleRepository, JsonlAuditLog,
};
use astrolabe_radar::{IncidentTransition, LifecycleEvent};
use astrolabe_state_manager::{ModeStore, OperatingMode, SnapshotRegistry};
use astrolabe_structures::{
    FsmEvent, FsmEventKind, InboundEvent, SensorReading, Severity, Snapshot, SubsystemId,
    TrackId,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::ServiceResult;

/// Payload keys stamped on rule-driven FSM events
pub const INCIDENT_ID_PAYLOAD_KEY: &str = "incident_id";
pub const TRACK_ID_PAYLOAD_KEY: &str = "track_id";
pub const INCIDENT_RULE_PAYLOAD_KEY: &str = "incident_rule";

/// What caused a proposed transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// An enabled incident rule matched a lifecycle transition
    Incident {
        rule_id: String,
        track_id: TrackId,
        incident_id: Uuid,
        transition: IncidentTransition,
    },
    /// A start/stop command addressed directly to a subsystem
    Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecisionOutcome {
    /// A disabled rule matched; nothing was forwarded
    Suppressed {
        rule_id: String,
        track_id: TrackId,
        incident_id: Uuid,
        transition: IncidentTransition,
    },
    Applied {
        trigger: Trigger,
        event: FsmEventKind,
        snapshot: Snapshot,
        /// Info-severity guard rule that fired without blocking
        advisory: Option<String>,
        mode: OperatingMode,
    },
    Denied {
        trigger: Trigger,
        subsystem_id: SubsystemId,
        event: FsmEventKind,
        guard_rule_id: String,
    },
    /// Vetoed and raised for operator attention
    Escalated {
        trigger: Trigger,
        subsystem_id: SubsystemId,
        event: FsmEventKind,
        guard_rule_id: String,
        severity: Severity,
        /// The track is acknowledged; the escalation must not re-alert
        alert_suppressed: bool,
    },
    /// The FSM refused the transition; the snapshot is unchanged
    Rejected {
        trigger: Trigger,
        subsystem_id: SubsystemId,
        event: FsmEventKind,
        reason: String,
    },
}

impl DecisionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DecisionOutcome::Applied { .. })
    }

    pub fn subsystem_id(&self) -> Option<&SubsystemId> {
        match self {
            DecisionOutcome::Suppressed { .. } => None,
            DecisionOutcome::Applied { snapshot, .. } => Some(&snapshot.subsystem_id),
            DecisionOutcome::Denied { subsystem_id, .. }
            | DecisionOutcome::Escalated { subsystem_id, .. }
            | DecisionOutcome::Rejected { subsystem_id, .. } => Some(subsystem_id),
        }
    }
}

/// Wires the rule repository, guard table and FSM engine over a shared
/// snapshot registry. Cheap to share behind an `Arc` across ingress shards.
pub struct DecisionPipeline {
    engine: FsmEngine,
    guard: Arc<GuardTableHandle>,
    rules: Arc<IncidentRuleRepository>,
    registry: Arc<SnapshotRegistry>,
    mode: Arc<ModeStore>,
    default_subsystem: SubsystemId,
}

impl DecisionPipeline {
    pub fn new(
        guard: Arc<GuardTableHandle>,
        rules: Arc<IncidentRuleRepository>,
        registry: Arc<SnapshotRegistry>,
        mode: Arc<ModeStore>,
        default_subsystem: SubsystemId,
    ) -> Self {
        Self {
            engine: FsmEngine::new(),
            guard,
            rules,
            registry,
            mode,
            default_subsystem,
        }
    }

    /// Load the guard table and incident rules named by `config` and open its
    /// audit log. Any load failure is fatal.
    pub fn from_config(config: &AstrolabeConfig, mode: Arc<ModeStore>) -> ServiceResult<Self> {
        let options = LoadOptions {
            require_non_empty: config.guard.require_non_empty,
        };
        let guard = GuardTableHandle::load_from_file(&config.paths.guard_table_path, options)?;
        let audit = Arc::new(JsonlAuditLog::open(&config.paths.audit_log_path)?);
        let rules = IncidentRuleRepository::load(&config.paths.incident_rules_path, audit)?;
        let default_subsystem = SubsystemId::new(config.ingress.default_subsystem_id.as_str());
        default_subsystem.validate()?;

        info!(
            target: "astrolabe-services",
            "Decision pipeline ready (guard generation {}, {} incident rules, mode {})",
            guard.generation(),
            rules.rules().len(),
            mode.get()
        );
        Ok(Self::new(
            Arc::new(guard),
            Arc::new(rules),
            Arc::new(SnapshotRegistry::new()),
            mode,
            default_subsystem,
        ))
    }

    pub fn guard(&self) -> &Arc<GuardTableHandle> {
        &self.guard
    }

    pub fn rules(&self) -> &Arc<IncidentRuleRepository> {
        &self.rules
    }

    pub fn registry(&self) -> &Arc<SnapshotRegistry> {
        &self.registry
    }

    pub fn mode(&self) -> &Arc<ModeStore> {
        &self.mode
    }

    /// Route one lifecycle transition through every matching incident rule.
    ///
    /// Rules are visited in id order against a single rule-set snapshot, so a
    /// concurrent `set_enabled` never splits one event across two versions.
    pub fn on_lifecycle_event(&self, event: &LifecycleEvent) -> Vec<DecisionOutcome> {
        let rules = self.rules.rules();
        let observation = IncidentObservation::from(event);
        let mut outcomes = Vec::new();

        for rule in rules.matching(&observation) {
            if !rule.enabled {
                debug!(
                    target: "astrolabe-services",
                    "Disabled rule '{}' matched {} of track '{}'",
                    rule.id,
                    event.transition,
                    event.track_id
                );
                outcomes.push(DecisionOutcome::Suppressed {
                    rule_id: rule.id.clone(),
                    track_id: event.track_id.clone(),
                    incident_id: event.incident_id,
                    transition: event.transition,
                });
                continue;
            }
            let Some(kind) = rule.forwarded_event(event.transition) else {
                continue;
            };
            let fsm_event = self.rule_event(rule, event, kind);
            let trigger = Trigger::Incident {
                rule_id: rule.id.clone(),
                track_id: event.track_id.clone(),
                incident_id: event.incident_id,
                transition: event.transition,
            };
            outcomes.push(self.gate_and_apply(trigger, fsm_event, event.range_m, event.alert_suppressed));
        }
        outcomes
    }

    /// Apply a direct start/stop command. A command carrying `range_m` is
    /// guard-gated; one without is not.
    pub fn on_subsystem_command(&self, command: &InboundEvent) -> ServiceResult<DecisionOutcome> {
        command.validate()?;
        let fsm_event = command.to_fsm_event()?;
        let range_m = command.range_m()?;
        Ok(self.gate_and_apply(Trigger::Command, fsm_event, range_m, false))
    }

    fn rule_event(&self, rule: &IncidentRule, event: &LifecycleEvent, kind: FsmEventKind) -> FsmEvent {
        let subsystem_id = rule
            .emit
            .subsystem_id
            .clone()
            .unwrap_or_else(|| self.default_subsystem.clone());
        FsmEvent::new(subsystem_id, kind)
            .with_payload(INCIDENT_ID_PAYLOAD_KEY, event.incident_id.to_string())
            .with_payload(TRACK_ID_PAYLOAD_KEY, event.track_id.as_str())
            .with_payload(INCIDENT_RULE_PAYLOAD_KEY, rule.id.as_str())
    }

    fn gate_and_apply(
        &self,
        trigger: Trigger,
        event: FsmEvent,
        range_m: Option<f64>,
        alert_suppressed: bool,
    ) -> DecisionOutcome {
        let mut advisory = None;
        if let Some(range_m) = range_m {
            let reading = match SensorReading::new(range_m) {
                Ok(reading) => reading,
                Err(err) => {
                    return DecisionOutcome::Rejected {
                        trigger,
                        subsystem_id: event.subsystem_id,
                        event: event.kind,
                        reason: err.to_string(),
                    }
                }
            };
            match self.guard.evaluate(event.kind, &reading) {
                Decision::Allow { advisory: fired } => advisory = fired,
                Decision::Deny { rule_id } => {
                    info!(
                        target: "astrolabe-services",
                        "Guard rule '{}' denied '{}' for subsystem '{}' at {} m",
                        rule_id,
                        event.kind,
                        event.subsystem_id,
                        range_m
                    );
                    return DecisionOutcome::Denied {
                        trigger,
                        subsystem_id: event.subsystem_id,
                        event: event.kind,
                        guard_rule_id: rule_id,
                    };
                }
                Decision::Escalate { rule_id, severity } => {
                    warn!(
                        target: "astrolabe-services",
                        "Guard rule '{}' ({}) escalated '{}' for subsystem '{}' at {} m",
                        rule_id,
                        severity,
                        event.kind,
                        event.subsystem_id,
                        range_m
                    );
                    return DecisionOutcome::Escalated {
                        trigger,
                        subsystem_id: event.subsystem_id,
                        event: event.kind,
                        guard_rule_id: rule_id,
                        severity,
                        alert_suppressed,
                    };
                }
            }
        }

        let engine = self.engine;
        match self
            .registry
            .apply(&event.subsystem_id, |snapshot| engine.handle(snapshot, &event))
        {
            Ok(snapshot) => {
                debug!(
                    target: "astrolabe-services",
                    "Subsystem '{}' -> {} on '{}'",
                    snapshot.subsystem_id,
                    snapshot.state,
                    event.kind
                );
                DecisionOutcome::Applied {
                    trigger,
                    event: event.kind,
                    snapshot,
                    advisory,
                    mode: self.mode.get(),
                }
            }
            Err(err) => {
                warn!(
                    target: "astrolabe-services",
                    "Subsystem '{}' rejected '{}': {}",
                    event.subsystem_id,
                    event.kind,
                    err
                );
                DecisionOutcome::Rejected {
                    trigger,
                    subsystem_id: event.subsystem_id,
                    event: event.kind,
                    reason: err.to_string(),
                }
            }
        }
    }
}
