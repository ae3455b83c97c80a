// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Overrides;

/// Command-line arguments for `petribot`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "petribot",
    version,
    about = "Chat bot that fetches pages, asks a completion API and runs a local AI tool under supervision.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Petribot.toml` in the current directory is used when it
    /// exists, otherwise built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PETRIBOT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Directory the external tool runs in (overrides config and env).
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// External tool executable (overrides config and env).
    #[arg(long, value_name = "PATH")]
    pub cli_path: Option<String>,

    /// Default operation deadline in seconds (overrides config and env).
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Handle this single message, print the replies and exit.
    #[arg(short, long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Load and validate the configuration, print it, and exit.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            work_dir: self.work_dir.clone(),
            cli_path: self.cli_path.clone(),
            timeout_seconds: self.timeout,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_become_overrides() {
        let args = CliArgs::parse_from([
            "petribot",
            "--cli-path",
            "/usr/local/bin/tool",
            "--timeout",
            "60",
            "--work-dir",
            "/srv",
        ]);
        let o = args.overrides();
        assert_eq!(o.cli_path.as_deref(), Some("/usr/local/bin/tool"));
        assert_eq!(o.timeout_seconds, Some(60));
        assert_eq!(o.work_dir, Some(PathBuf::from("/srv")));
    }

    #[test]
    fn single_message_mode() {
        let args = CliArgs::parse_from(["petribot", "-m", "/help"]);
        assert_eq!(args.message.as_deref(), Some("/help"));
        assert!(args.config.is_none());
    }
}
