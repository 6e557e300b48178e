//! LINE stock bot webhook server
//!
//! # Usage
//!
//! ```bash
//! export LINE_CHANNEL_ACCESS_TOKEN="..."
//! export LINE_CHANNEL_SECRET="..."
//! export IMGUR_CLIENT_ID="..."      # optional, enables charts
//! export OPENAI_API_KEY="..."       # optional, enables AI reports
//!
//! cargo run --bin stockline -- --port 5000
//! ```

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use stockline::api::TwseClient;
use stockline::platforms::{LineBot, LineMessagingClient};
use stockline::{BotConfig, StockBot, StockDirectory, server};
use stockline_utils::{LogFormat, init_tracing, load_dotenv};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "stockline", version, about = "LINE webhook bot for Taiwan stocks")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on; overrides the configured port
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Log output format: pretty or json
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,

    /// Start without downloading the TWSE stock directory
    #[arg(long)]
    skip_directory: bool,
}

async fn load_directory(config: &BotConfig, skip: bool) -> StockDirectory {
    if skip {
        info!("Skipping stock directory download");
        return StockDirectory::new();
    }

    let result = match TwseClient::new(config.request_timeout) {
        Ok(client) => client.fetch_directory().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(directory) => {
            info!(stocks = directory.len(), "Loaded stock directory");
            directory
        }
        Err(e) => {
            warn!(error = %e, "Stock directory unavailable; company names fall back to codes");
            StockDirectory::new()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let args = Args::parse();
    init_tracing(args.log_format);

    let mut config = BotConfig::from_env().context("invalid configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    info!(?config, "Starting stockline");

    let directory = Arc::new(load_directory(&config, args.skip_directory).await);

    let messaging = LineMessagingClient::new(&config.channel_access_token, config.request_timeout)
        .context("failed to build LINE client")?;
    let channel_secret = config.channel_secret.clone();
    let addr: SocketAddr = format!("{}:{}", args.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.host, config.port))?;

    let bot = StockBot::from_config(config, directory).context("failed to build bot")?;
    let line = Arc::new(LineBot::new(
        Arc::new(bot),
        Arc::new(messaging),
        channel_secret,
    ));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Webhook listening");

    axum::serve(listener, server::router(line))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
