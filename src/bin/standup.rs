//! CLI binary for the daily standup.
//!
//! Meant to be run by a scheduler; every flag is optional.

use anyhow::Context;
use clap::Parser;
use standup::delivery::payload_preview;
use standup::error::StandupError;
use standup::pipeline::{self, RunOptions};
use standup::{DiscordWebhook, Settings, StandupConfig, TaigaSource};
use std::path::PathBuf;
use std::process::ExitCode;
use taiga_client::TaigaClient;
use tracing_subscriber::EnvFilter;

/// Post the daily sprint standup to a Discord webhook.
#[derive(Parser)]
#[command(name = "standup", version, about)]
struct Cli {
    /// Path to a TOML file with non-secret options. Falls back to `STANDUP_CONFIG`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fetch, render and format, print the payload JSON, skip delivery.
    #[arg(long)]
    dry_run: bool,

    /// Do not add the broadcast tag for this run.
    #[arg(long)]
    no_broadcast: bool,
}

fn main() -> ExitCode {
    // Logs go to stderr so `--dry-run` output on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("standup=info,taiga_client=info")),
        )
        .init();

    let cli = Cli::parse();

    let runtime = match build_runtime() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code(), "{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

/// Single-threaded: the run is a strict sequence of HTTP calls.
fn build_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn load_options(cli: &Cli) -> Result<StandupConfig, StandupError> {
    let options = StandupConfig::load(cli.config.as_deref(), |key| std::env::var(key).ok())?;
    Ok(if cli.no_broadcast {
        options.without_broadcast()
    } else {
        options
    })
}

async fn run(cli: Cli) -> Result<(), StandupError> {
    let settings = Settings::from_env(load_options(&cli)?)?;

    let client = TaigaClient::new(settings.options.taiga.client_config())
        .map_err(StandupError::from_login)?;
    let source = TaigaSource::new(client);
    let sink = DiscordWebhook::new(settings.webhook.clone(), &settings.options.delivery)?;

    let options = RunOptions {
        dry_run: cli.dry_run,
    };
    let outcome = pipeline::execute(&settings, &source, &sink, options).await?;
    if cli.dry_run {
        let preview = payload_preview(
            &outcome.message,
            settings.options.delivery.username.as_deref(),
        )?;
        println!("{preview}");
    }
    Ok(())
}
