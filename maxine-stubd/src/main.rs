use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use maxine_stubd::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("maxine_stubd=info"))
        )
        .init();

    tracing::info!("Starting maxine-stubd");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/maxine/stubd.toml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    tracing::info!(
        "Loaded {} fixture nodes from {}",
        config.services.len(),
        config_path
    );

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();
    let running = maxine_stubd::start(config, cancel.clone()).await?;

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");

    cancel.cancel();
    running.join().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
