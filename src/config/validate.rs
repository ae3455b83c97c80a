// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PetribotError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PetribotError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

/// Upper bound for `timeout_seconds` and `progress_interval_seconds` (one week).
pub const MAX_DURATION_SECONDS: u64 = 7 * 24 * 60 * 60;

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_supervisor(cfg)?;
    validate_completion(cfg)?;
    validate_bot(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> PetribotError {
    PetribotError::ConfigError(msg.into())
}

fn validate_supervisor(cfg: &RawConfigFile) -> Result<()> {
    let sup = &cfg.supervisor;

    if sup.cli_path.trim().is_empty() {
        return Err(config_error("[supervisor].cli_path must not be empty"));
    }
    if sup.timeout_seconds == 0 {
        return Err(config_error(
            "[supervisor].timeout_seconds must be >= 1 (got 0)",
        ));
    }
    if sup.progress_interval_seconds == 0 {
        return Err(config_error(
            "[supervisor].progress_interval_seconds must be >= 1 (got 0)",
        ));
    }
    for (key, value) in [
        ("timeout_seconds", sup.timeout_seconds),
        ("progress_interval_seconds", sup.progress_interval_seconds),
    ] {
        if value > MAX_DURATION_SECONDS {
            return Err(config_error(format!(
                "[supervisor].{key} must be <= {MAX_DURATION_SECONDS} (got {value})"
            )));
        }
    }
    if sup.status_buffer == 0 {
        return Err(config_error(
            "[supervisor].status_buffer must be >= 1 (got 0)",
        ));
    }
    if sup.unattended && sup.unattended_flag.trim().is_empty() {
        return Err(config_error(
            "[supervisor].unattended = true requires a non-empty unattended_flag",
        ));
    }
    Ok(())
}

fn validate_completion(cfg: &RawConfigFile) -> Result<()> {
    let c = &cfg.completion;

    if c.api_url.trim().is_empty() {
        return Err(config_error("[completion].api_url must not be empty"));
    }
    if c.api_key_env.trim().is_empty() {
        return Err(config_error("[completion].api_key_env must not be empty"));
    }
    if !(0.0..=2.0).contains(&c.temperature) {
        return Err(config_error(format!(
            "[completion].temperature must be within 0.0..=2.0 (got {})",
            c.temperature
        )));
    }
    Ok(())
}

fn validate_bot(cfg: &RawConfigFile) -> Result<()> {
    if cfg.bot.reply_limit == 0 {
        return Err(config_error("[bot].reply_limit must be >= 1 (got 0)"));
    }
    Ok(())
}
