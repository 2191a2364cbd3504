// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-crate debug selection.
//!
//! A crate is raised to `debug` by `--debug-<crate>` on the command line,
//! by `--debug=<crate>,<crate>`, or by listing it in `ASTROLABE_DEBUG`.
//! `all` in any of these selects every crate in [`KNOWN_CRATES`].

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

pub const DEBUG_ENV_VAR: &str = "ASTROLABE_DEBUG";

const FLAG_PREFIX: &str = "--debug-";
const LIST_FLAG: &str = "--debug=";

/// Crates whose log target is raised to `debug`.
///
/// ```rust
/// use astrolabe_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(["--debug=astrolabe-radar".to_string()]);
/// assert!(flags.is_enabled("astrolabe-radar"));
/// assert_eq!(flags.to_filter_string("info"), "astrolabe-radar=debug,info");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Collect selections from an argument list. Unrelated arguments are ignored.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = Self::default();
        for arg in args {
            if let Some(list) = arg.strip_prefix(LIST_FLAG) {
                flags.select_list(list);
            } else if let Some(name) = arg.strip_prefix(FLAG_PREFIX) {
                flags.select(name);
            }
        }
        flags
    }

    /// Add the comma-separated names in `value` (the `ASTROLABE_DEBUG` format).
    pub fn merge_env_value(&mut self, value: &str) {
        self.select_list(value);
    }

    fn select_list(&mut self, list: &str) {
        list.split(',').for_each(|name| self.select(name));
    }

    fn select(&mut self, name: &str) {
        match name.trim() {
            "" => {}
            "all" => self
                .enabled_crates
                .extend(KNOWN_CRATES.iter().map(|known| known.to_string())),
            name => {
                self.enabled_crates.insert(name.to_string());
            }
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `EnvFilter` directives: one `<crate>=debug` per selection in name
    /// order, then `base_level` as the default directive.
    pub fn to_filter_string(&self, base_level: &str) -> String {
        self.enabled_crates
            .iter()
            .map(|name| format!("{}=debug,", name))
            .chain(std::iter::once(base_level.to_string()))
            .collect()
    }
}

/// True for the arguments [`CrateDebugFlags::from_args`] consumes.
pub fn is_debug_flag(arg: &str) -> bool {
    arg.starts_with(FLAG_PREFIX) || arg.starts_with(LIST_FLAG)
}

/// Selections from `args` merged with `ASTROLABE_DEBUG`.
pub fn parse_debug_flags<I>(args: I) -> CrateDebugFlags
where
    I: IntoIterator<Item = String>,
{
    let mut flags = CrateDebugFlags::from_args(args);
    if let Ok(value) = env::var(DEBUG_ENV_VAR) {
        flags.merge_env_value(&value);
    }
    flags
}

/// Usage text for the `--help` output of binaries built on this crate.
pub fn debug_flags_help() -> String {
    let mut help = String::from("Debug logging:\n");
    help.push_str("  --debug-<crate>            raise one crate to debug\n");
    help.push_str("  --debug=<crate>[,<crate>]  raise several crates\n");
    help.push_str("  --debug-all                raise every crate\n");
    help.push_str(&format!("  {}=<crate>[,<crate>]|all\n\n", DEBUG_ENV_VAR));
    help.push_str("Crates:\n");
    for name in KNOWN_CRATES {
        help.push_str(&format!("  {}\n", name));
    }
    help
}
