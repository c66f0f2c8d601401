/// Keystore-backed wallet bridge
///
/// Accounts come from a JSON file of secret URIs:
///
/// ```json
/// [
///   { "name": "Alice", "suri": "//Alice" },
///   { "name": "Treasury", "suri": "bottom drive obey lake curtain smoke basket hold race lonely fit walk//treasury" }
/// ]
/// ```
///
/// Key derivation and sr25519 signing are done by `subxt-signer`. A missing
/// keystore file means no wallet is installed.
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use subxt_signer::{sr25519::Keypair, SecretUri};
use tokio::sync::Mutex;

use super::{Account, TransactionSigner, WalletBridge, WalletSignature, WalletSource};
use crate::address::{self, GENERIC_SUBSTRATE_PREFIX};
use crate::error::WalletError;

/// Wallet source name reported for keystore accounts
pub const KEYSTORE_SOURCE: &str = "keystore";

#[derive(Debug, Deserialize)]
struct KeystoreEntry {
    name: String,
    suri: String,
}

struct KeyEntry {
    name: String,
    account_id: [u8; 32],
    keypair: Keypair,
}

struct Keystore {
    keys: Vec<KeyEntry>,
}

impl Keystore {
    async fn load(path: &Path) -> Result<Option<Self>, WalletError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No keystore at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let entries: Vec<KeystoreEntry> = serde_json::from_str(&content)?;

        let keys = entries
            .into_iter()
            .map(|entry| {
                let uri = SecretUri::from_str(&entry.suri).map_err(|e| WalletError::InvalidSecret {
                    name: entry.name.clone(),
                    reason: e.to_string(),
                })?;
                let keypair = Keypair::from_uri(&uri).map_err(|e| WalletError::InvalidSecret {
                    name: entry.name.clone(),
                    reason: e.to_string(),
                })?;
                Ok(KeyEntry {
                    name: entry.name,
                    account_id: keypair.public_key().0,
                    keypair,
                })
            })
            .collect::<Result<Vec<_>, WalletError>>()?;

        log::info!("🔑 Loaded {} keystore account(s) from {}", keys.len(), path.display());
        Ok(Some(Self { keys }))
    }

    fn accounts(&self) -> Result<Vec<Account>, WalletError> {
        self.keys
            .iter()
            .map(|key| {
                let address = address::encode(&key.account_id, GENERIC_SUBSTRATE_PREFIX)
                    .map_err(|e| WalletError::InvalidSecret {
                        name: key.name.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(Account::new(address, KEYSTORE_SOURCE, key.name.clone()))
            })
            .collect()
    }
}

pub struct KeystoreWallet {
    path: PathBuf,
    keystore: Mutex<Option<Arc<Keystore>>>,
}

impl KeystoreWallet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keystore: Mutex::new(None),
        }
    }

    /// Loaded keystore, reading the file until a load succeeds
    async fn keystore(&self) -> Result<Option<Arc<Keystore>>, WalletError> {
        let mut guard = self.keystore.lock().await;
        if guard.is_none() {
            *guard = Keystore::load(&self.path).await?.map(Arc::new);
        }
        Ok(guard.clone())
    }

    async fn require(&self, source: &str) -> Result<Arc<Keystore>, WalletError> {
        if source != KEYSTORE_SOURCE {
            return Err(WalletError::UnknownSource(source.to_string()));
        }
        self.keystore()
            .await?
            .ok_or_else(|| WalletError::UnknownSource(source.to_string()))
    }
}

#[async_trait]
impl WalletBridge for KeystoreWallet {
    async fn enable(&self, app_name: &str) -> Result<Vec<WalletSource>, WalletError> {
        log::debug!("Enabling keystore wallet for '{}'", app_name);
        Ok(match self.keystore().await? {
            Some(_) => vec![WalletSource {
                name: KEYSTORE_SOURCE.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            }],
            None => Vec::new(),
        })
    }

    async fn accounts(&self, source: &str) -> Result<Vec<Account>, WalletError> {
        self.require(source).await?.accounts()
    }

    async fn signer(&self, source: &str) -> Result<Arc<dyn TransactionSigner>, WalletError> {
        let keystore = self.require(source).await?;
        Ok(Arc::new(KeystoreSigner { keystore }))
    }
}

struct KeystoreSigner {
    keystore: Arc<Keystore>,
}

#[async_trait]
impl TransactionSigner for KeystoreSigner {
    async fn sign(&self, address: &str, payload: &[u8]) -> Result<WalletSignature, WalletError> {
        // Accounts are matched by key, so any network encoding of the address works
        let account_id = address::account_id(address)
            .map_err(|_| WalletError::UnknownAccount(address.to_string()))?;

        let key = self
            .keystore
            .keys
            .iter()
            .find(|key| key.account_id == account_id)
            .ok_or_else(|| WalletError::UnknownAccount(address.to_string()))?;

        log::debug!("Signing {} byte payload as {}", payload.len(), key.name);
        Ok(WalletSignature::Sr25519(key.keypair.sign(payload).0))
    }
}
