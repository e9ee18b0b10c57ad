//! ttvc - reads a Discord text channel aloud in a voice channel
//!
//! Send `>join>` while in a voice channel to bind the current text channel,
//! `>leave>` to stop, `>h-leave>` to clear a stuck connection.

use anyhow::Context as _;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use ttvc_adaptor_discord::{DiscordAdapterService, DiscordConfig};
use ttvc_core::{init_logging, load_env, load_env_from_path, BotConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Environment file to load instead of ./.env
    #[arg(short, long)]
    env_file: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. info, debug, ttvc_core=trace)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Speech synthesis endpoint, overrides TTVC_TTS_ENDPOINT
    #[arg(long)]
    tts_endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env may carry TTVC_LOG_LEVEL, so load it before the subscriber exists
    let env_loaded = match &cli.env_file {
        Some(path) => load_env_from_path(path).map(Some),
        None => load_env(),
    };
    init_logging(cli.log_level.as_deref()).context("failed to initialize logging")?;
    match env_loaded? {
        Some(path) => info!("✓ Loaded environment from: {}", path.display()),
        None => warn!("No .env file found - using system environment variables only"),
    }

    let mut config = BotConfig::from_env()?;
    if let Some(endpoint) = cli.tts_endpoint {
        config = config.with_tts_endpoint(endpoint);
    }
    info!(?config, "Configuration loaded");

    let mut service = DiscordAdapterService::new(DiscordConfig::from(&config));
    service.start().await?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown requested");
        }
        _ = service.closed() => {
            error!("Discord client stopped");
        }
    }

    service.stop().await?;
    Ok(())
}
