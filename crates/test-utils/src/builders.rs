#![allow(dead_code)]

use std::path::PathBuf;

use petribot::config::{ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn cli_path(mut self, path: &str) -> Self {
        self.config.supervisor.cli_path = path.to_string();
        self
    }

    pub fn tool_args(mut self, args: &[&str]) -> Self {
        self.config.supervisor.tool_args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.supervisor.work_dir = dir.into();
        self
    }

    pub fn timeout_seconds(mut self, secs: u64) -> Self {
        self.config.supervisor.timeout_seconds = secs;
        self
    }

    pub fn unattended(mut self, val: bool) -> Self {
        self.config.supervisor.unattended = val;
        self
    }

    pub fn reply_limit(mut self, limit: usize) -> Self {
        self.config.bot.reply_limit = limit;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
