//! Error types for asset transfer operations
//!
//! One enum per layer: configuration, address codec, wallet bridge, chain
//! client, startup sequence and the transfer form itself.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(key: &str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address is not valid base58: {0}")]
    InvalidBase58(String),

    #[error("Unexpected address length: {0} bytes")]
    InvalidLength(usize),

    #[error("Address checksum mismatch")]
    BadChecksum,

    #[error("Unsupported network prefix: {0}")]
    InvalidPrefix(u16),
}

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Keystore IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keystore JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid secret for account '{name}': {reason}")]
    InvalidSecret { name: String, reason: String },

    #[error("Unknown wallet source: {0}")]
    UnknownSource(String),

    #[error("Account not managed by this wallet: {0}")]
    UnknownAccount(String),

    #[error("Signing rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug, Clone)]
pub enum ChainError {
    #[error("Failed to connect to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("Unknown asset id: {0}")]
    UnknownAsset(String),

    #[error("Invalid asset id '{0}'")]
    InvalidAssetId(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("Chain query failed: {0}")]
    Query(String),

    #[error("Transaction construction failed: {0}")]
    Construction(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Unsupported transfer: {0}")]
    Unsupported(String),
}

impl ChainError {
    pub fn connection(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }
}

/// Fatal errors of the startup sequence. An absent wallet is not an error;
/// it is reported as its own state.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Wallet unavailable: {0}")]
    Wallet(#[from] WalletError),

    #[error("Chain unavailable: {0}")]
    Chain(#[from] ChainError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Invalid transfer: {0}")]
    Validation(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("A transfer is already being submitted")]
    Busy,

    #[error("The form is not ready")]
    NotReady,

    #[error("No transfer is being submitted")]
    NothingToCancel,
}
