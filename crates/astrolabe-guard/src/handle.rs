// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use astrolabe_observability::failure_tags;
use astrolabe_structures::{FsmEventKind, SensorReading};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::GuardResult;
use crate::rule::Decision;
use crate::table::{GuardTable, LoadOptions};

/// Shared, hot-reloadable access to the active guard table.
///
/// Evaluators clone the current `Arc` and never hold the lock while
/// evaluating. A reload validates the candidate completely before it is
/// swapped in; on failure the previous table stays active.
pub struct GuardTableHandle {
    active: RwLock<Arc<GuardTable>>,
    generation: AtomicU64,
}

impl GuardTableHandle {
    pub fn new(table: GuardTable) -> Self {
        Self {
            active: RwLock::new(Arc::new(table)),
            generation: AtomicU64::new(1),
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>, options: LoadOptions) -> GuardResult<Self> {
        Ok(Self::new(GuardTable::from_file(path, options)?))
    }

    pub fn current(&self) -> Arc<GuardTable> {
        Arc::clone(&self.active.read())
    }

    pub fn evaluate(&self, event: FsmEventKind, reading: &SensorReading) -> Decision {
        self.current().evaluate(event, reading)
    }

    /// Number of tables activated so far, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Activate an already validated table. Returns the new generation.
    pub fn replace(&self, table: GuardTable) -> u64 {
        let mut active = self.active.write();
        *active = Arc::new(table);
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn reload_from_file(&self, path: impl AsRef<Path>, options: LoadOptions) -> GuardResult<u64> {
        let path = path.as_ref();
        match GuardTable::from_file(path, options) {
            Ok(table) => {
                let rule_count = table.len();
                let generation = self.replace(table);
                info!(
                    target: "astrolabe-guard",
                    "Guard table generation {} active ({} rules)",
                    generation,
                    rule_count
                );
                Ok(generation)
            }
            Err(err) => {
                warn!(
                    target: "astrolabe-guard",
                    "{} Keeping guard table generation {}; reload from {} failed: {}",
                    failure_tags::GUARD_RELOAD_REJECTED,
                    self.generation(),
                    path.display(),
                    err
                );
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for GuardTableHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardTableHandle")
            .field("generation", &self.generation())
            .field("rules", &self.current().len())
            .finish()
    }
}
