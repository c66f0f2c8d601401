use anyhow::Context;
use asset_transfer::api::server;
use asset_transfer::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger (set RUST_LOG=debug for verbose output, RUST_LOG=info for normal)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    log::info!("Starting asset transfer page for asset {} on {}", config.asset_id, config.rpc_endpoint);
    log::info!("Wallet keystore: {}", config.keystore_path.display());
    server::start_server(config).await.context("Server error")?;
    Ok(())
}
