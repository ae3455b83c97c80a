// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PetribotError, Result};

pub const ENV_WORK_DIR: &str = "PETRIBOT_WORK_DIR";
pub const ENV_CLI_PATH: &str = "PETRIBOT_CLI_PATH";
pub const ENV_TIMEOUT: &str = "PETRIBOT_TIMEOUT";

/// Values that take precedence over both the file and the environment
/// (normally taken from CLI flags).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub work_dir: Option<PathBuf>,
    pub cli_path: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Overrides {
    pub fn apply(&self, raw: &mut RawConfigFile) {
        if let Some(dir) = &self.work_dir {
            raw.supervisor.work_dir = dir.clone();
        }
        if let Some(path) = &self.cli_path {
            raw.supervisor.cli_path = path.clone();
        }
        if let Some(secs) = self.timeout_seconds {
            raw.supervisor.timeout_seconds = secs;
        }
    }
}

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration the binary actually runs with.
///
/// Precedence, lowest first:
/// 1. built-in defaults,
/// 2. the TOML file (`path`, or [`default_config_path`] if it exists),
/// 3. `PETRIBOT_*` environment variables,
/// 4. `overrides`.
///
/// An explicitly given `path` must exist; the default path is optional.
pub fn load_effective(path: Option<&Path>, overrides: &Overrides) -> Result<ConfigFile> {
    let mut raw = match path {
        Some(p) => load_from_path(p)?,
        None => {
            let p = default_config_path();
            if p.is_file() {
                load_from_path(&p)?
            } else {
                debug!(path = %p.display(), "no config file found; using defaults");
                RawConfigFile::default()
            }
        }
    };

    apply_env_overrides(&mut raw, |key| std::env::var(key).ok())?;
    overrides.apply(&mut raw);

    ConfigFile::try_from(raw)
}

/// Apply `PETRIBOT_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(raw: &mut RawConfigFile, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(ENV_WORK_DIR) {
        raw.supervisor.work_dir = PathBuf::from(dir);
    }
    if let Some(path) = lookup(ENV_CLI_PATH) {
        raw.supervisor.cli_path = path;
    }
    if let Some(secs) = lookup(ENV_TIMEOUT) {
        raw.supervisor.timeout_seconds = secs.trim().parse().map_err(|_| {
            PetribotError::ConfigError(format!(
                "{ENV_TIMEOUT} must be a whole number of seconds (got '{secs}')"
            ))
        })?;
    }
    Ok(())
}

/// `Petribot.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Petribot.toml")
}
