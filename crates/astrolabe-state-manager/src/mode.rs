// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Process-wide operating mode.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Result, StateError};

pub const MODE_ENV_VAR: &str = "ASTROLABE_MODE";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    #[default]
    Nominal,
    Safe,
    Maintenance,
}

impl OperatingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingMode::Nominal => "nominal",
            OperatingMode::Safe => "safe",
            OperatingMode::Maintenance => "maintenance",
        }
    }
}

impl Display for OperatingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperatingMode {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nominal" => Ok(OperatingMode::Nominal),
            "safe" => Ok(OperatingMode::Safe),
            "maintenance" => Ok(OperatingMode::Maintenance),
            _ => Err(StateError::UnknownMode(s.to_string())),
        }
    }
}

static GLOBAL: OnceCell<Arc<ModeStore>> = OnceCell::new();

/// Current operating mode behind a single lock.
///
/// Remembers the mode it was created with so [`ModeStore::reset`] can put it
/// back between tests.
#[derive(Debug)]
pub struct ModeStore {
    current: RwLock<OperatingMode>,
    initial: OperatingMode,
}

impl ModeStore {
    pub fn new(initial: OperatingMode) -> Self {
        Self {
            current: RwLock::new(initial),
            initial,
        }
    }

    /// Initial mode from `ASTROLABE_MODE`, or nominal when unset.
    pub fn from_env() -> Result<Self> {
        let initial = match std::env::var(MODE_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => OperatingMode::default(),
        };
        Ok(Self::new(initial))
    }

    /// The process-wide store, initialised from the environment on first use.
    pub fn global() -> Result<Arc<ModeStore>> {
        GLOBAL
            .get_or_try_init(|| -> Result<Arc<ModeStore>> {
                let store = Self::from_env()?;
                info!(
                    target: "astrolabe-state-manager",
                    "Operating mode initialised to {}",
                    store.initial
                );
                Ok(Arc::new(store))
            })
            .map(Arc::clone)
    }

    pub fn get(&self) -> OperatingMode {
        *self.current.read()
    }

    /// Switch mode, returning the previous one.
    pub fn set(&self, mode: OperatingMode) -> OperatingMode {
        let previous = std::mem::replace(&mut *self.current.write(), mode);
        if previous != mode {
            info!(
                target: "astrolabe-state-manager",
                "Operating mode {} -> {}",
                previous,
                mode
            );
        }
        previous
    }

    pub fn initial(&self) -> OperatingMode {
        self.initial
    }

    pub fn reset(&self) {
        self.set(self.initial);
    }
}
