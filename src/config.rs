/// Application configuration from environment variables
///
/// One configurable front-end covers every deployment. A network preset
/// supplies defaults (asset, endpoint, address format, transfer mode) and
/// individual variables override them.
use std::path::PathBuf;
use std::time::Duration;

use crate::address::{AddressEncoding, POLKADOT_PREFIX};
use crate::chain::{FeePayment, TransferMode};
use crate::error::ConfigError;

/// Asset Hub parachain id, the destination used by batched transfers
pub const ASSET_HUB_PARACHAIN_ID: &str = "1000";

const WESTMINT_RPC: &str = "wss://westmint-rpc.polkadot.io";
const STATEMINT_RPC: &str = "wss://statemint-rpc.polkadot.io";
const MAX_SS58_PREFIX: u16 = 16_383;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkPreset {
    /// Westmint testnet with the JOE test token
    Westmint,
    /// Polkadot Asset Hub with USDC
    AssetHub,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub preset: NetworkPreset,
    /// Name announced to the wallet when enabling it
    pub app_name: String,
    pub asset_id: String,
    /// WebSocket RPC endpoint of the chain node
    pub rpc_endpoint: String,
    pub address_encoding: AddressEncoding,
    pub transfer_mode: TransferMode,
    pub fee_payment: FeePayment,
    /// Longest wait for the next transaction status before giving up
    pub submission_timeout: Duration,
    pub keystore_path: PathBuf,
    pub bind_address: String,
}

impl AppConfig {
    /// Defaults for a network preset
    pub fn for_preset(preset: NetworkPreset) -> Self {
        let (asset_id, rpc_endpoint, address_encoding, transfer_mode) = match preset {
            NetworkPreset::Westmint => (
                "8",
                WESTMINT_RPC,
                AddressEncoding::Passthrough,
                TransferMode::BatchedCrossChain {
                    destination: ASSET_HUB_PARACHAIN_ID.to_string(),
                },
            ),
            NetworkPreset::AssetHub => (
                "1337",
                STATEMINT_RPC,
                AddressEncoding::Network(POLKADOT_PREFIX),
                TransferMode::Direct,
            ),
        };

        Self {
            preset,
            app_name: "Transact USDC".to_string(),
            asset_id: asset_id.to_string(),
            rpc_endpoint: rpc_endpoint.to_string(),
            address_encoding,
            transfer_mode,
            fee_payment: FeePayment::TransferAsset,
            submission_timeout: Duration::from_secs(120),
            keystore_path: PathBuf::from("keystore.json"),
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }

    /// Load configuration from `.env` and the process environment
    ///
    /// Environment variables:
    /// - `NETWORK_PRESET`: "westmint" (default) or "asset-hub"
    /// - `APP_NAME`: name announced to the wallet
    /// - `ASSET_ID`: asset to transfer
    /// - `RPC_URL`: chain node WebSocket endpoint
    /// - `ADDRESS_FORMAT`: "passthrough" or an SS58 prefix number
    /// - `TRANSFER_MODE`: "direct" or "batched"
    /// - `DESTINATION_CHAIN`: parachain id for batched transfers (default 1000)
    /// - `FEE_ASSET`: "transfer-asset" (default) or "native"
    /// - `SUBMISSION_TIMEOUT_SECS`: status timeout (default 120)
    /// - `KEYSTORE_PATH`: wallet keystore file (default keystore.json)
    /// - `BIND_ADDRESS`: HTTP listen address (default 127.0.0.1:3000)
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Westmint test token (default)
    /// cargo run
    ///
    /// # USDC on Polkadot Asset Hub
    /// NETWORK_PRESET=asset-hub cargo run
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let preset = match var("NETWORK_PRESET").map(|v| v.to_lowercase()) {
            None => NetworkPreset::Westmint,
            Some(name) => match name.as_str() {
                "westmint" => NetworkPreset::Westmint,
                "asset-hub" | "assethub" | "statemint" => NetworkPreset::AssetHub,
                other => {
                    log::warn!("⚠️  Unknown network preset '{}', defaulting to Westmint", other);
                    NetworkPreset::Westmint
                }
            },
        };
        let mut config = Self::for_preset(preset);

        if let Some(app_name) = var("APP_NAME") {
            config.app_name = app_name;
        }

        if let Some(asset_id) = var("ASSET_ID") {
            if asset_id.parse::<u32>().is_err() {
                return Err(ConfigError::invalid("ASSET_ID", asset_id, "expected a numeric asset id"));
            }
            config.asset_id = asset_id;
        }

        if let Some(url) = var("RPC_URL") {
            if !(url.starts_with("ws://") || url.starts_with("wss://")) {
                return Err(ConfigError::invalid("RPC_URL", url, "expected a ws:// or wss:// URL"));
            }
            config.rpc_endpoint = url;
        }

        if let Some(format) = var("ADDRESS_FORMAT") {
            config.address_encoding = parse_address_format(&format)?;
        }

        let destination = var("DESTINATION_CHAIN");
        if let Some(mode) = var("TRANSFER_MODE") {
            config.transfer_mode = match mode.to_lowercase().as_str() {
                "direct" => TransferMode::Direct,
                "batched" | "batched-cross-chain" => TransferMode::BatchedCrossChain {
                    destination: ASSET_HUB_PARACHAIN_ID.to_string(),
                },
                _ => {
                    return Err(ConfigError::invalid(
                        "TRANSFER_MODE",
                        mode,
                        "expected 'direct' or 'batched'",
                    ))
                }
            };
        }
        if let Some(destination) = destination {
            match &mut config.transfer_mode {
                TransferMode::BatchedCrossChain { destination: current } => *current = destination,
                TransferMode::Direct => {
                    log::warn!("DESTINATION_CHAIN={} ignored for direct transfers", destination)
                }
            }
        }

        if let Some(fee) = var("FEE_ASSET") {
            config.fee_payment = match fee.to_lowercase().as_str() {
                "native" => FeePayment::Native,
                "transfer-asset" | "asset" => FeePayment::TransferAsset,
                _ => {
                    return Err(ConfigError::invalid(
                        "FEE_ASSET",
                        fee,
                        "expected 'native' or 'transfer-asset'",
                    ))
                }
            };
        }

        if let Some(secs) = var("SUBMISSION_TIMEOUT_SECS") {
            let parsed = secs
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| {
                    ConfigError::invalid("SUBMISSION_TIMEOUT_SECS", &secs, "expected a positive number of seconds")
                })?;
            config.submission_timeout = Duration::from_secs(parsed);
        }

        if let Some(path) = var("KEYSTORE_PATH") {
            config.keystore_path = PathBuf::from(path);
        }

        if let Some(addr) = var("BIND_ADDRESS") {
            config.bind_address = addr;
        }

        log::info!("🌐 Network preset: {:?}", config.preset);
        log::info!("📡 RPC endpoint: {}", config.rpc_endpoint);
        log::info!("🪙 Asset id: {} ({:?} transfers)", config.asset_id, config.transfer_mode);
        log::info!("⛽ Fees paid in: {:?}", config.fee_payment);

        Ok(config)
    }
}

impl Default for AppConfig {
    /// Default configuration (Westmint)
    fn default() -> Self {
        Self::for_preset(NetworkPreset::Westmint)
    }
}

fn parse_address_format(value: &str) -> Result<AddressEncoding, ConfigError> {
    if value.eq_ignore_ascii_case("passthrough") {
        return Ok(AddressEncoding::Passthrough);
    }
    value
        .parse::<u16>()
        .ok()
        .filter(|prefix| *prefix <= MAX_SS58_PREFIX)
        .map(AddressEncoding::Network)
        .ok_or_else(|| {
            ConfigError::invalid(
                "ADDRESS_FORMAT",
                value,
                "expected 'passthrough' or an SS58 prefix between 0 and 16383",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_is_westmint() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.asset_id, "8");
        assert_eq!(config.address_encoding, AddressEncoding::Passthrough);
        assert!(matches!(config.transfer_mode, TransferMode::BatchedCrossChain { .. }));
        assert_eq!(config.fee_payment, FeePayment::TransferAsset);
    }

    #[test]
    fn test_asset_hub_preset() {
        let config = AppConfig::from_lookup(lookup(&[("NETWORK_PRESET", "asset-hub")])).unwrap();
        assert_eq!(config.asset_id, "1337");
        assert_eq!(config.rpc_endpoint, STATEMINT_RPC);
        assert_eq!(config.address_encoding, AddressEncoding::Network(0));
        assert_eq!(config.transfer_mode, TransferMode::Direct);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ASSET_ID", "42"),
            ("RPC_URL", "ws://127.0.0.1:9944"),
            ("ADDRESS_FORMAT", "2"),
            ("DESTINATION_CHAIN", "2000"),
            ("SUBMISSION_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.asset_id, "42");
        assert_eq!(config.rpc_endpoint, "ws://127.0.0.1:9944");
        assert_eq!(config.address_encoding, AddressEncoding::Network(2));
        assert_eq!(
            config.transfer_mode,
            TransferMode::BatchedCrossChain {
                destination: "2000".to_string()
            }
        );
        assert_eq!(config.submission_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(AppConfig::from_lookup(lookup(&[("ASSET_ID", "usdc")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("RPC_URL", "http://node")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("ADDRESS_FORMAT", "70000")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("TRANSFER_MODE", "xcm")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("SUBMISSION_TIMEOUT_SECS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("FEE_ASSET", "dot")])).is_err());
    }

    #[test]
    fn test_fee_asset() {
        let hub = AppConfig::from_lookup(lookup(&[("NETWORK_PRESET", "asset-hub")])).unwrap();
        assert_eq!(hub.fee_payment, FeePayment::TransferAsset);

        let native = AppConfig::from_lookup(lookup(&[("FEE_ASSET", "Native")])).unwrap();
        assert_eq!(native.fee_payment, FeePayment::Native);
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        let config = AppConfig::from_lookup(lookup(&[("NETWORK_PRESET", "rococo")])).unwrap();
        assert_eq!(config.preset, NetworkPreset::Westmint);
    }
}
