use anyhow::Context;
use clap::Parser;
use configuration::{ConfigOverrides, init_tracing, load_config};
use engine::build_tracker;
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Keeps a Google Sheet up to date with the top cryptocurrencies by market cap.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults to ./config.toml when it exists.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Write to an in-memory sheet and log its contents instead of Google Sheets.
    #[arg(long)]
    dry_run: bool,
}

/// The main entry point for the tracker.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment and CLI can supply everything.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), &cli.overrides)
        .context("Failed to load configuration")?;
    // Held until exit so buffered file logs are flushed.
    let _log_guard = init_tracing(&config.logging).context("Failed to initialize logging")?;

    let mut tracker =
        build_tracker(&config, cli.dry_run).context("Failed to set up the tracker")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Without a handler the tracker runs until killed; keep the
                // sender alive so the loop does not read its drop as a stop.
                error!(error = %e, "Failed to listen for Ctrl+C");
                shutdown_tx.closed().await;
            }
        }
    });

    tracker.run(shutdown_rx).await.context("Tracker failed")?;
    info!("Goodbye.");
    Ok(())
}
