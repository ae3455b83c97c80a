// src/config/mod.rs

//! Configuration loading and validation for petribot.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and layer env/CLI overrides (`loader.rs`).
//! - Validate value ranges (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{Overrides, default_config_path, load_and_validate, load_effective, load_from_path};
pub use model::{
    BotConfig, CompletionConfig, ConfigFile, FetchConfig, RawConfigFile, SupervisorConfig,
};
