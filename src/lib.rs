//! Asset Transfer: single-page transfers on Polkadot Asset Hub
//!
//! Connects to a wallet, lists its accounts, shows the balance of one asset
//! and submits transfers of that asset, reporting each transaction status
//! until the transfer is included in a block or fails.
//!
//! # Architecture
//!
//! - **Wallet bridge**: enables a wallet, lists accounts and hands out signers
//! - **Chain client**: asset metadata, balances and transfer submission over subxt
//! - **Transfer form**: validation and the submission state machine
//! - **Session**: startup phase, background balance fetches and status watching
//! - **API**: server-rendered page plus a JSON state endpoint
//!
//! # Example
//!
//! ```ignore
//! use asset_transfer::{AppConfig, api::server};
//!
//! let config = AppConfig::from_env()?;
//! server::start_server(config).await?;
//! ```

// Public modules
pub mod address;
pub mod api;
pub mod chain;
pub mod config;
pub mod error;
pub mod form;
pub mod session;
pub mod startup;
pub mod wallet;

// Re-exports for convenience
pub use address::AddressEncoding;
pub use chain::{
    AssetMetadata, ChainClient, ChainConnector, ChainInfo, FeePayment, SubstrateClient,
    SubstrateConnector, TransferMode, TransferRequest, TxStatus,
};
pub use config::{AppConfig, NetworkPreset};
pub use error::{AddressError, ChainError, ConfigError, StartupError, TransferError, WalletError};
pub use form::{BalanceView, FailureKind, SubmissionState, TransferForm};
pub use session::{AppPhase, TransferSession};
pub use wallet::{Account, KeystoreWallet, TransactionSigner, WalletBridge, WalletSignature, WalletSource};
