// src/lib.rs

pub mod bot;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod services;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::bot::Router;
use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_effective};
use crate::exec::ProcessSupervisor;
use crate::services::{HttpCompletionClient, HttpPageFetcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file, env, CLI overrides)
/// - the process supervisor and the HTTP collaborators
/// - the command router
/// - the console transport (or a single `--message`)
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_effective(args.config.as_deref(), &args.overrides())
        .context("loading configuration")?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(());
    }

    let router = Arc::new(build_router(&cfg)?);

    match args.message {
        Some(message) => bot::console::handle_once(&router, &message).await?,
        None => bot::console::run(router).await?,
    }
    Ok(())
}

/// Build the production router from a validated config.
pub fn build_router(cfg: &ConfigFile) -> Result<Router> {
    let sup = &cfg.supervisor;
    if sup.unattended {
        warn!(
            flag = %sup.unattended_flag,
            "external tool runs unattended: its confirmation prompts are suppressed"
        );
    }
    info!(
        cli_path = %sup.cli_path,
        work_dir = %sup.work_dir.display(),
        timeout_secs = sup.timeout_seconds,
        "process supervisor configured"
    );

    let supervisor = ProcessSupervisor::from_config(sup);
    let completion =
        HttpCompletionClient::new(&cfg.completion).context("building completion client")?;
    if !completion.has_api_key() {
        warn!(
            env = %cfg.completion.api_key_env,
            "no API key found; /deepseek will report a configuration error"
        );
    }
    let fetcher = HttpPageFetcher::new(&cfg.fetch).context("building page fetcher")?;

    Ok(Router::new(
        Arc::new(completion),
        Arc::new(fetcher),
        Arc::new(supervisor),
        cfg.bot.reply_limit,
    ))
}

/// Print the effective configuration as TOML.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    let rendered = toml::to_string_pretty(cfg).context("rendering configuration")?;
    println!("petribot dry-run (effective configuration)");
    println!();
    print!("{rendered}");
    Ok(())
}
