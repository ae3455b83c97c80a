// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [supervisor]
/// work_dir = "."
/// cli_path = "claude"
/// timeout_seconds = 300
///
/// [completion]
/// model = "deepseek-chat"
///
/// [bot]
/// reply_limit = 4000
/// ```
///
/// Every section and field is optional; missing values fall back to the
/// defaults documented on each field.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub supervisor: SupervisorConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub bot: BotConfig,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigFile {
    pub supervisor: SupervisorConfig,
    pub completion: CompletionConfig,
    pub fetch: FetchConfig,
    pub bot: BotConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            supervisor: raw.supervisor,
            completion: raw.completion,
            fetch: raw.fetch,
            bot: raw.bot,
        }
    }
}

/// `[supervisor]` section: how the external tool is launched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Directory the tool runs in. Default `"."`.
    pub work_dir: PathBuf,

    /// Tool executable, looked up on `PATH` when not absolute.
    /// Default `"claude"`.
    pub cli_path: String,

    /// Arguments placed before the operation. Default `["-p"]`
    /// (non-interactive print mode).
    pub tool_args: Vec<String>,

    /// Whether to append `unattended_flag`, granting the tool authority to
    /// act without confirmation prompts. Default `true`.
    pub unattended: bool,

    /// Default `"--dangerously-skip-permissions"`.
    pub unattended_flag: String,

    /// Deadline used when the caller does not give one. Default 300.
    pub timeout_seconds: u64,

    /// Heartbeat period for progress events. Default 10.
    pub progress_interval_seconds: u64,

    /// Capacity of the status channel. Default 8.
    pub status_buffer: usize,
}

impl SupervisorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_seconds)
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            cli_path: "claude".to_string(),
            tool_args: vec!["-p".to_string()],
            unattended: true,
            unattended_flag: "--dangerously-skip-permissions".to_string(),
            timeout_seconds: 300,
            progress_interval_seconds: 10,
            status_buffer: 8,
        }
    }
}

/// `[completion]` section: the remote chat-completion API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub api_url: String,
    pub model: String,

    /// Name of the environment variable holding the bearer key. The key
    /// itself never lives in the config file.
    pub api_key_env: String,

    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_seconds: u64,
}

impl CompletionConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.deepseek.com/v1/chat/completions".to_string(),
            model: "deepseek-chat".to_string(),
            api_key_env: "DEEPSEEK_API_KEY".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            request_timeout_seconds: 30,
        }
    }
}

/// `[fetch]` section: the HTML fetcher.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_seconds: 10 }
    }
}

/// `[bot]` section: reply formatting.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    /// Replies longer than this many characters are truncated.
    pub reply_limit: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self { reply_limit: 4000 }
    }
}
