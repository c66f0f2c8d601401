//! Chain client
//!
//! All chain access (asset metadata, balances, transaction construction and
//! submission) goes through `ChainClient`. `ChainConnector` opens clients so
//! the connection step can be swapped out in tests.

pub mod asset_hub;
pub mod substrate;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::ChainError;
use crate::wallet::{Account, TransactionSigner};

pub use asset_hub::{asset_location, AssetHubConfig, AssetLocation};
pub use substrate::{SubstrateClient, SubstrateConnector};
pub use types::{
    format_balance, AssetMetadata, ChainInfo, FeePayment, TransferMode, TransferRequest, TxStatus,
};

/// Status updates of a submitted transaction, ending after a terminal status
pub type TxStatusStream = BoxStream<'static, TxStatus>;

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Runtime details reported when the connection was opened
    fn info(&self) -> ChainInfo;

    /// Metadata of an asset. Unknown ids are `ChainError::UnknownAsset`.
    async fn asset_metadata(&self, asset_id: &str) -> Result<AssetMetadata, ChainError>;

    /// Balance of an asset held by `address`. Accounts that never held the
    /// asset have a zero balance.
    async fn asset_balance(&self, asset_id: &str, address: &str) -> Result<u128, ChainError>;

    /// Build the transfer for `mode`, have `signer` sign it for `sender` and
    /// submit it with fees paid as `fee` says
    async fn submit_transfer(
        &self,
        request: &TransferRequest,
        mode: &TransferMode,
        fee: FeePayment,
        sender: &Account,
        signer: Arc<dyn TransactionSigner>,
    ) -> Result<TxStatusStream, ChainError>;
}

#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn ChainClient>, ChainError>;
}
