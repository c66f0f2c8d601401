/// Startup sequence
///
/// Enable the wallet, list its accounts, format their addresses, connect to
/// the chain and read the asset metadata. Runs once before the form is shown.
use std::sync::Arc;

use crate::address;
use crate::chain::{AssetMetadata, ChainClient, ChainConnector};
use crate::config::AppConfig;
use crate::error::StartupError;
use crate::wallet::{Account, WalletBridge, WalletSource};

/// Everything the form needs once startup succeeded
pub struct ReadyContext {
    pub source: WalletSource,
    pub accounts: Vec<Account>,
    pub chain: Arc<dyn ChainClient>,
    pub asset: AssetMetadata,
}

pub enum StartupOutcome {
    Ready(ReadyContext),
    /// No wallet, or a wallet without accounts
    NoWallet(String),
}

pub async fn initialize(
    config: &AppConfig,
    wallet: &dyn WalletBridge,
    connector: &dyn ChainConnector,
) -> Result<StartupOutcome, StartupError> {
    log::info!("🔌 Enabling wallet for '{}'", config.app_name);
    let sources = wallet.enable(&config.app_name).await?;
    let Some(source) = sources.into_iter().next() else {
        log::warn!("No wallet available");
        return Ok(StartupOutcome::NoWallet(
            "No wallet is available. Install or configure a wallet and reload.".to_string(),
        ));
    };

    let accounts = wallet.accounts(&source.name).await?;
    if accounts.is_empty() {
        log::warn!("Wallet '{}' has no accounts", source.name);
        return Ok(StartupOutcome::NoWallet(format!(
            "Wallet '{}' has no accounts. Add an account and reload.",
            source.name
        )));
    }
    let accounts = address::format_accounts(accounts, config.address_encoding);
    log::info!("👛 {} account(s) from '{}' ({})", accounts.len(), source.name, config.address_encoding);

    log::info!("📡 Connecting to {}", config.rpc_endpoint);
    let chain = connector.connect(&config.rpc_endpoint).await?;

    let asset = chain.asset_metadata(&config.asset_id).await?;
    log::info!(
        "🪙 Asset {}: {} ({}), {} decimals",
        config.asset_id,
        asset.name,
        asset.symbol,
        asset.decimals
    );

    Ok(StartupOutcome::Ready(ReadyContext {
        source,
        accounts,
        chain,
        asset,
    }))
}
