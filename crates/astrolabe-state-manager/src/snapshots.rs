// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Authoritative FSM snapshot per subsystem instance.

use ahash::AHashMap;
use astrolabe_structures::{Snapshot, SubsystemId};
use parking_lot::RwLock;
use tracing::trace;

#[derive(Debug, Default)]
pub struct SnapshotRegistry {
    snapshots: RwLock<AHashMap<SubsystemId, Snapshot>>,
}

impl SnapshotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, subsystem_id: &SubsystemId) -> Option<Snapshot> {
        self.snapshots.read().get(subsystem_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }

    pub fn subsystem_ids(&self) -> Vec<SubsystemId> {
        let mut ids: Vec<SubsystemId> = self.snapshots.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Run `transition` against the current snapshot of `subsystem_id`.
    ///
    /// A subsystem seen for the first time starts from an IDLE snapshot. The
    /// result is stored only when `transition` succeeds; on error the
    /// registry is left exactly as it was. Applies are serialized.
    pub fn apply<E, F>(&self, subsystem_id: &SubsystemId, transition: F) -> Result<Snapshot, E>
    where
        F: FnOnce(&Snapshot) -> Result<Snapshot, E>,
    {
        let mut snapshots = self.snapshots.write();
        let next = match snapshots.get(subsystem_id) {
            Some(current) => transition(current)?,
            None => transition(&Snapshot::new(subsystem_id.clone()))?,
        };
        trace!(
            target: "astrolabe-state-manager",
            "Subsystem '{}' now {} (v{})",
            subsystem_id,
            next.state,
            next.version
        );
        snapshots.insert(subsystem_id.clone(), next.clone());
        Ok(next)
    }
}
