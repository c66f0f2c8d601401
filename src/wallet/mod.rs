//! Wallet bridge
//!
//! The front-end never touches key material. It asks a wallet for its
//! accounts and for a signer, and hands signer payloads to that signer.
//!
//! - `WalletBridge` - enable a wallet, list accounts, obtain signers
//! - `TransactionSigner` - signs a payload on behalf of one of the accounts
//! - `keystore` - bridge backed by a local keystore file

pub mod keystore;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

pub use keystore::KeystoreWallet;

/// An account exposed by a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    pub meta: AccountMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    /// Name of the wallet source that manages the account
    pub source: String,
    pub name: String,
}

impl Account {
    pub fn new(address: impl Into<String>, source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            meta: AccountMeta {
                source: source.into(),
                name: name.into(),
            },
        }
    }
}

/// A wallet provider that agreed to serve this application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSource {
    pub name: String,
    pub version: String,
}

/// Signature produced by a wallet, tagged with its scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletSignature {
    Sr25519([u8; 64]),
    Ed25519([u8; 64]),
    Ecdsa([u8; 65]),
}

#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Sign `payload` with the key behind `address`
    async fn sign(&self, address: &str, payload: &[u8]) -> Result<WalletSignature, WalletError>;
}

#[async_trait]
pub trait WalletBridge: Send + Sync {
    /// Ask every available wallet to serve `app_name`. An empty list means
    /// no wallet is installed or none agreed.
    async fn enable(&self, app_name: &str) -> Result<Vec<WalletSource>, WalletError>;

    /// Accounts managed by one wallet source
    async fn accounts(&self, source: &str) -> Result<Vec<Account>, WalletError>;

    /// Signer for accounts of one wallet source
    async fn signer(&self, source: &str) -> Result<Arc<dyn TransactionSigner>, WalletError>;
}
