// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers winning:
//! 1. TOML file (base values, defaults for anything missing)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)
//!
//! The merged result is validated before it is returned.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::validation::validate_config;
use crate::{AstrolabeConfig, ConfigError, ConfigResult};

pub const CONFIG_FILE_NAME: &str = "astrolabe.toml";
pub const CONFIG_PATH_ENV_VAR: &str = "ASTROLABE_CONFIG_PATH";

/// Locate `astrolabe.toml`.
///
/// `ASTROLABE_CONFIG_PATH` wins when set and must name an existing file.
/// Otherwise the working directory and up to five of its ancestors are
/// tried, nearest first.
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(explicit) = env::var(CONFIG_PATH_ENV_VAR) {
        let explicit = PathBuf::from(explicit);
        return if explicit.is_file() {
            Ok(explicit)
        } else {
            Err(ConfigError::FileNotFound(format!(
                "{} points at {}, which does not exist",
                CONFIG_PATH_ENV_VAR,
                explicit.display()
            )))
        };
    }

    let candidates: Vec<PathBuf> = env::current_dir()
        .map(|cwd| {
            cwd.ancestors()
                .take(6)
                .map(|dir| dir.join(CONFIG_FILE_NAME))
                .collect()
        })
        .unwrap_or_default();

    candidates
        .iter()
        .find(|candidate| candidate.is_file())
        .cloned()
        .ok_or_else(|| {
            let tried: Vec<String> = candidates.iter().map(|c| c.display().to_string()).collect();
            ConfigError::FileNotFound(format!(
                "{} is not in [{}]; set {} to load another file",
                CONFIG_FILE_NAME,
                tried.join(", "),
                CONFIG_PATH_ENV_VAR
            ))
        })
}

/// Read `config_path` (or the file [`find_config_file`] finds), apply the
/// environment and then `cli_args` on top, and validate the result.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<AstrolabeConfig> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let text = fs::read_to_string(&path).map_err(|source| ConfigError::IoError {
        path: path.clone(),
        source,
    })?;
    let mut config: AstrolabeConfig =
        toml::from_str(&text).map_err(|err| ConfigError::ParseError {
            path: path.clone(),
            reason: err.to_string(),
        })?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli_args) = cli_args {
        apply_cli_overrides(&mut config, cli_args)?;
    }
    validate_config(&config)?;

    Ok(config)
}

fn parse_override<T: FromStr>(source: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse::<T>().map_err(|_| {
        ConfigError::InvalidValue(format!("{} = '{}' could not be parsed", source, value))
    })
}

/// Applies one named override. Names are shared by the CLI keys and the
/// environment variables (`ASTROLABE_` + upper case).
fn apply_override(
    config: &mut AstrolabeConfig,
    key: &str,
    source: &str,
    value: &str,
) -> ConfigResult<()> {
    match key {
        "confirm_frames" => config.runtime.confirm_frames = parse_override(source, value)?,
        "cooldown_s" => config.runtime.cooldown_s = parse_override(source, value)?,
        "lost_contact_window_s" => {
            config.runtime.lost_contact_window_s = parse_override(source, value)?
        }
        "auto_resolve_after_lost_s" => {
            config.runtime.auto_resolve_after_lost_s = parse_override(source, value)?
        }
        "ack_snooze_s" => config.runtime.ack_snooze_s = parse_override(source, value)?,
        "guard_table_path" => config.paths.guard_table_path = PathBuf::from(value),
        "incident_rules_path" => config.paths.incident_rules_path = PathBuf::from(value),
        "audit_log_path" => config.paths.audit_log_path = PathBuf::from(value),
        "ingress_shards" => config.ingress.shards = parse_override(source, value)?,
        "log_level" => config.logging.level = value.trim().to_lowercase(),
        _ => {}
    }
    Ok(())
}

/// Keys recognised by both override tiers
pub const OVERRIDE_KEYS: &[&str] = &[
    "confirm_frames",
    "cooldown_s",
    "lost_contact_window_s",
    "auto_resolve_after_lost_s",
    "ack_snooze_s",
    "guard_table_path",
    "incident_rules_path",
    "audit_log_path",
    "ingress_shards",
    "log_level",
];

/// Override from `ASTROLABE_<KEY>` for every key in [`OVERRIDE_KEYS`],
/// e.g. `ASTROLABE_CONFIRM_FRAMES` or `ASTROLABE_AUDIT_LOG_PATH`.
///
/// A value that does not parse is an error, never a silent fallback.
pub fn apply_environment_overrides(config: &mut AstrolabeConfig) -> ConfigResult<()> {
    for key in OVERRIDE_KEYS {
        let var = format!("ASTROLABE_{}", key.to_uppercase());
        if let Ok(value) = env::var(&var) {
            apply_override(config, key, &var, &value)?;
        }
    }
    Ok(())
}

/// Override from a map keyed by [`OVERRIDE_KEYS`], e.g. `{"confirm_frames": "1"}`.
pub fn apply_cli_overrides(
    config: &mut AstrolabeConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    for key in OVERRIDE_KEYS {
        if let Some(value) = cli_args.get(*key) {
            apply_override(config, key, &format!("--{}", key), value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV: Mutex<()> = Mutex::new(());

    fn write_config(dir: &Path, lines: &[&str]) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn clear_env() {
        for key in OVERRIDE_KEYS {
            env::remove_var(format!("ASTROLABE_{}", key.to_uppercase()));
        }
    }

    #[test]
    fn explicit_path_variable_is_used() {
        let _env = ENV.lock().unwrap();
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("mission.toml");
        fs::write(&explicit, "").unwrap();

        env::set_var(CONFIG_PATH_ENV_VAR, &explicit);
        let found = find_config_file();
        env::remove_var(CONFIG_PATH_ENV_VAR);

        assert_eq!(found.unwrap(), explicit);
    }

    #[test]
    fn explicit_path_variable_must_exist() {
        let _env = ENV.lock().unwrap();
        env::set_var(CONFIG_PATH_ENV_VAR, "/nonexistent/astrolabe.toml");
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV_VAR);

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let _env = ENV.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            &[
                "[runtime]",
                "confirm_frames = 1",
                "lost_contact_window_s = 2",
                "[paths]",
                "audit_log_path = \"/var/astrolabe/audit.jsonl\"",
            ],
        );

        let config = load_config(Some(&path), None).unwrap();

        assert_eq!(config.runtime.confirm_frames, 1);
        assert_eq!(config.runtime.lost_contact_window_s, 2.0);
        assert_eq!(
            config.paths.audit_log_path,
            PathBuf::from("/var/astrolabe/audit.jsonl")
        );
        assert_eq!(
            config.paths.guard_table_path,
            PathBuf::from("config/guard_table.json")
        );
    }

    #[test]
    fn environment_overrides_file_values() {
        let _env = ENV.lock().unwrap();
        clear_env();
        let mut config = AstrolabeConfig::default();

        env::set_var("ASTROLABE_CONFIRM_FRAMES", "7");
        env::set_var("ASTROLABE_INCIDENT_RULES_PATH", "/etc/astrolabe/rules.json");
        env::set_var("ASTROLABE_LOG_LEVEL", "DEBUG");
        let result = apply_environment_overrides(&mut config);
        clear_env();

        result.unwrap();
        assert_eq!(config.runtime.confirm_frames, 7);
        assert_eq!(
            config.paths.incident_rules_path,
            PathBuf::from("/etc/astrolabe/rules.json")
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn unparseable_environment_value_is_rejected() {
        let _env = ENV.lock().unwrap();
        clear_env();
        let mut config = AstrolabeConfig::default();

        env::set_var("ASTROLABE_COOLDOWN_S", "soon");
        let result = apply_environment_overrides(&mut config);
        clear_env();

        assert!(matches!(result, Err(ConfigError::InvalidValue(msg)) if msg.contains("ASTROLABE_COOLDOWN_S")));
        assert_eq!(config.runtime.cooldown_s, 30.0);
    }

    #[test]
    fn cli_keys_override() {
        let mut config = AstrolabeConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("ack_snooze_s".to_string(), "12.5".to_string());
        cli_args.insert("ingress_shards".to_string(), "2".to_string());

        apply_cli_overrides(&mut config, &cli_args).unwrap();

        assert_eq!(config.runtime.ack_snooze_s, 12.5);
        assert_eq!(config.ingress.shards, 2);
    }

    #[test]
    fn cli_beats_environment_beats_file() {
        let _env = ENV.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), &["[runtime]", "confirm_frames = 2", "cooldown_s = 10"]);

        env::set_var("ASTROLABE_CONFIRM_FRAMES", "4");
        env::set_var("ASTROLABE_COOLDOWN_S", "20");
        let cli: HashMap<String, String> =
            [("confirm_frames".to_string(), "5".to_string())].into_iter().collect();

        let loaded = load_config(Some(&path), Some(&cli));
        clear_env();
        let config = loaded.unwrap();

        assert_eq!(config.runtime.confirm_frames, 5);
        assert_eq!(config.runtime.cooldown_s, 20.0);
    }

    #[test]
    fn merged_values_are_validated() {
        let _env = ENV.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), &["[runtime]", "confirm_frames = 0"]);

        assert!(matches!(
            load_config(Some(&path), None),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        match load_config(Some(&missing), None) {
            Err(ConfigError::IoError { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected IoError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), &["[runtime"]);

        assert!(matches!(
            load_config(Some(&path), None),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
