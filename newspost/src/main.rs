/*
newspost - main.rs
This binary resolves configuration and credentials, then serves the HTTP API with Rocket.
*/

use anyhow::Result;
use clap::Parser;
use common::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newspost::server::{launch_rocket, AppState};

#[derive(Parser, Debug)]
#[command(name = "newspost", about = "Blog post generator HTTP service")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the bind address from config
    #[arg(long)]
    bind: Option<String>,

    /// Override the port from config
    #[arg(long)]
    port: Option<u16>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // A missing .env is fine; real deployments set the environment directly
    if let Ok(path) = dotenv::dotenv() {
        info!(path = ?path, "loaded environment from .env");
    }

    let config = load_config(args.config).await?;

    // Both API keys must be present before anything binds
    let credentials = match config.resolve_credentials() {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "missing required credential");
            return Err(e.into());
        }
    };

    let generator = newspost::build_generator(&config, &credentials)?;
    let state = AppState {
        generator: Arc::new(generator),
    };

    let bind = args.bind.unwrap_or_else(|| config.bind_address());
    let port = args.port.unwrap_or_else(|| config.port());

    if let Err(e) = launch_rocket(&bind, port, state).await {
        error!(%e, "Rocket server failed");
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}

/// Merge `config.default.toml` with `--config FILE` (or `./config.toml` when present).
async fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    match Config::discover(Path::new("."), explicit.as_deref()).await {
        Ok(cfg) => {
            info!(override_file = ?explicit, "configuration loaded");
            Ok(cfg)
        }
        Err(e) => {
            error!(%e, "failed to load configuration");
            Err(e)
        }
    }
}
