//! Tracrafter monitoring server
//!
//! Usage: `tracrafter-api [config.json]`

use anyhow::Context;
use tracrafter_api::{start_server, AppState};
use tracrafter_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lending=debug".parse()?)
                .add_directive("price_feed=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            AppConfig::load(&path).with_context(|| format!("Failed to load config from {path}"))?
        }
        None => {
            tracing::warn!("No config file given, using defaults without prices");
            AppConfig::default()
        }
    };

    let port = config.api_port;
    let state = AppState::from_config(config).context("Failed to initialize pool")?;
    start_server(state, port).await?;

    Ok(())
}
