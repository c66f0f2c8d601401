// Substrate chain client
//
// Talks to an Asset Hub node over WebSocket RPC using subxt's dynamic
// storage and transaction APIs, so no generated runtime metadata is needed:
// - asset metadata and balances from the Assets pallet
// - keep-alive transfers, optionally wrapped in a utility batch
// - fees in the native token or in the transferred asset
// - signing delegated to the wallet through the signer payload

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use subxt::backend::legacy::LegacyRpcMethods;
use subxt::backend::rpc::RpcClient;
use subxt::config::DefaultExtrinsicParamsBuilder;
use subxt::dynamic::Value;
use subxt::ext::scale_value::{Composite, Primitive, ValueDef};
use subxt::tx::TxStatus as SubxtTxStatus;
use subxt::utils::{AccountId32, MultiAddress, MultiSignature};
use subxt::OnlineClient;

use super::asset_hub::{asset_location, AssetHubConfig};
use super::types::{AssetMetadata, ChainInfo, FeePayment, TransferMode, TransferRequest, TxStatus};
use super::{ChainClient, ChainConnector, TxStatusStream};
use crate::address;
use crate::error::ChainError;
use crate::wallet::{Account, TransactionSigner, WalletSignature};

type Client = OnlineClient<AssetHubConfig>;

/// Opens `SubstrateClient`s
#[derive(Debug, Clone, Default)]
pub struct SubstrateConnector;

impl SubstrateConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChainConnector for SubstrateConnector {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn ChainClient>, ChainError> {
        let client = SubstrateClient::connect(endpoint).await?;
        Ok(Arc::new(client))
    }
}

pub struct SubstrateClient {
    api: Client,
    info: ChainInfo,
}

impl SubstrateClient {
    /// Connect to a node and read the runtime details
    pub async fn connect(endpoint: &str) -> Result<Self, ChainError> {
        // Local development nodes are served over plain ws://
        let rpc = if endpoint.starts_with("ws://") {
            RpcClient::from_insecure_url(endpoint).await
        } else {
            RpcClient::from_url(endpoint).await
        }
        .map_err(|e| ChainError::connection(endpoint, e))?;

        let legacy = LegacyRpcMethods::<AssetHubConfig>::new(rpc.clone());
        let api = Client::from_rpc_client(rpc)
            .await
            .map_err(|e| ChainError::connection(endpoint, e))?;

        let version = legacy
            .state_get_runtime_version(None)
            .await
            .map_err(|e| ChainError::connection(endpoint, e))?;
        let spec_name = version
            .other
            .get("specName")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let mut client = Self {
            api,
            info: ChainInfo {
                spec_name,
                spec_version: version.spec_version,
                safe_xcm_version: None,
                parachain_id: None,
            },
        };
        client.info.safe_xcm_version = client.optional_u32("PolkadotXcm", "SafeXcmVersion").await;
        client.info.parachain_id = client.optional_u32("ParachainInfo", "ParachainId").await;

        log::info!(
            "🔗 Connected to {} (spec {} v{}, para {:?}, safe XCM {:?})",
            endpoint,
            client.info.spec_name,
            client.info.spec_version,
            client.info.parachain_id,
            client.info.safe_xcm_version
        );
        Ok(client)
    }

    /// Plain storage value holding a number, if the chain has it
    async fn optional_u32(&self, pallet: &str, entry: &str) -> Option<u32> {
        let address = subxt::dynamic::storage(pallet, entry, ());
        let fetched = async {
            self.api
                .storage()
                .at_latest()
                .await?
                .fetch(&address)
                .await
        }
        .await;

        match fetched {
            Ok(Some(thunk)) => thunk
                .to_value()
                .ok()
                .and_then(|value| first_number(&value))
                .and_then(|n| u32::try_from(n).ok()),
            Ok(None) => None,
            Err(e) => {
                log::debug!("{}.{} unavailable: {}", pallet, entry, e);
                None
            }
        }
    }
}

#[async_trait]
impl ChainClient for SubstrateClient {
    fn info(&self) -> ChainInfo {
        self.info.clone()
    }

    async fn asset_metadata(&self, asset_id: &str) -> Result<AssetMetadata, ChainError> {
        let id = parse_asset_id(asset_id)?;
        let address = subxt::dynamic::storage("Assets", "Metadata", vec![Value::u128(id as u128)]);

        let thunk = self
            .api
            .storage()
            .at_latest()
            .await
            .map_err(|e| ChainError::Query(e.to_string()))?
            .fetch(&address)
            .await
            .map_err(|e| ChainError::Query(e.to_string()))?
            .ok_or_else(|| ChainError::UnknownAsset(asset_id.to_string()))?;
        let value = thunk.to_value().map_err(|e| ChainError::Query(e.to_string()))?;

        let decimals = named_field(&value, "decimals")
            .and_then(first_number)
            .and_then(|d| u8::try_from(d).ok())
            .ok_or_else(|| ChainError::Query(format!("asset {} metadata has no decimals", asset_id)))?;

        Ok(AssetMetadata {
            name: text_field(&value, "name"),
            symbol: text_field(&value, "symbol"),
            decimals,
        })
    }

    async fn asset_balance(&self, asset_id: &str, address: &str) -> Result<u128, ChainError> {
        let id = parse_asset_id(asset_id)?;
        let account = address::account_id(address)?;
        let storage_address = subxt::dynamic::storage(
            "Assets",
            "Account",
            vec![Value::u128(id as u128), Value::from_bytes(account)],
        );

        let fetched = self
            .api
            .storage()
            .at_latest()
            .await
            .map_err(|e| ChainError::Query(e.to_string()))?
            .fetch(&storage_address)
            .await
            .map_err(|e| ChainError::Query(e.to_string()))?;

        let Some(thunk) = fetched else {
            return Ok(0);
        };
        let value = thunk.to_value().map_err(|e| ChainError::Query(e.to_string()))?;
        named_field(&value, "balance")
            .and_then(first_number)
            .ok_or_else(|| ChainError::Query(format!("asset account of {} has no balance", address)))
    }

    async fn submit_transfer(
        &self,
        request: &TransferRequest,
        mode: &TransferMode,
        fee: FeePayment,
        sender: &Account,
        signer: Arc<dyn TransactionSigner>,
    ) -> Result<TxStatusStream, ChainError> {
        let call = transfer_call(request, mode, self.info.parachain_id)?;
        let account_id = AccountId32(address::account_id(&sender.address)?);

        let params = match fee {
            FeePayment::Native => DefaultExtrinsicParamsBuilder::<AssetHubConfig>::new().build(),
            FeePayment::TransferAsset => {
                let location = asset_location(parse_asset_id(&request.asset_id)?);
                DefaultExtrinsicParamsBuilder::<AssetHubConfig>::new()
                    .tip_of(0, location)
                    .build()
            }
        };
        let partial = self
            .api
            .tx()
            .create_partial_signed(&call, &account_id, params)
            .await
            .map_err(|e| ChainError::Construction(e.to_string()))?;

        let signature = signer
            .sign(&sender.address, &partial.signer_payload())
            .await
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        let signature = match signature {
            WalletSignature::Sr25519(sig) => MultiSignature::Sr25519(sig),
            WalletSignature::Ed25519(sig) => MultiSignature::Ed25519(sig),
            WalletSignature::Ecdsa(sig) => MultiSignature::Ecdsa(sig),
        };

        let sender_address: MultiAddress<AccountId32, ()> = account_id.into();
        let progress = partial
            .sign_with_address_and_signature(&sender_address, &signature)
            .submit_and_watch()
            .await
            .map_err(|e| ChainError::Submission(e.to_string()))?;

        log::info!(
            "📤 Submitted transfer of {} (asset {}) from {}, fees in {:?}",
            request.amount,
            request.asset_id,
            sender.address,
            fee
        );
        Ok(progress.then(convert_status).boxed())
    }
}

async fn convert_status(
    status: Result<SubxtTxStatus<AssetHubConfig, Client>, subxt::Error>,
) -> TxStatus {
    match status {
        Err(e) => TxStatus::Error(e.to_string()),
        Ok(SubxtTxStatus::Validated) => TxStatus::Validated,
        Ok(SubxtTxStatus::Broadcasted { .. }) => TxStatus::Broadcast,
        Ok(SubxtTxStatus::NoLongerInBestBlock) => TxStatus::Retracted,
        Ok(SubxtTxStatus::InBestBlock(in_block)) => {
            let block_hash = format!("0x{}", hex::encode(in_block.block_hash().0));
            match in_block.wait_for_success().await {
                Ok(_) => TxStatus::InBlock { block_hash },
                Err(e) => TxStatus::DispatchFailed {
                    block_hash,
                    reason: e.to_string(),
                },
            }
        }
        Ok(SubxtTxStatus::InFinalizedBlock(in_block)) => {
            let block_hash = format!("0x{}", hex::encode(in_block.block_hash().0));
            match in_block.wait_for_success().await {
                Ok(_) => TxStatus::Finalized { block_hash },
                Err(e) => TxStatus::DispatchFailed {
                    block_hash,
                    reason: e.to_string(),
                },
            }
        }
        Ok(SubxtTxStatus::Error { message }) => TxStatus::Error(message),
        Ok(SubxtTxStatus::Invalid { message }) => TxStatus::Invalid(message),
        Ok(SubxtTxStatus::Dropped { message }) => TxStatus::Dropped(message),
    }
}

/// The `Assets.transfer_keep_alive` call for `request`, wrapped in a
/// `Utility.batch` for batched transfers. Batches are only built for the
/// chain itself, identified by `parachain_id`.
pub fn transfer_call(
    request: &TransferRequest,
    mode: &TransferMode,
    parachain_id: Option<u32>,
) -> Result<subxt::tx::DynamicPayload, ChainError> {
    let asset_id = parse_asset_id(&request.asset_id)?;
    let recipient = address::account_id(&request.recipient_address)?;
    let amount = request
        .amount
        .parse::<u128>()
        .map_err(|e| ChainError::Construction(format!("amount '{}': {}", request.amount, e)))?;

    let transfer = subxt::dynamic::tx(
        "Assets",
        "transfer_keep_alive",
        vec![
            Value::u128(asset_id as u128),
            Value::unnamed_variant("Id", vec![Value::from_bytes(recipient)]),
            Value::u128(amount),
        ],
    );

    match mode {
        TransferMode::Direct => Ok(transfer),
        TransferMode::BatchedCrossChain { destination } => {
            let local = parachain_id.map(|id| id.to_string());
            if local.as_deref() != Some(destination.as_str()) {
                return Err(ChainError::Unsupported(format!(
                    "destination chain {} is not the connected chain ({:?}); cross-chain messages are not built here",
                    destination, parachain_id
                )));
            }
            Ok(subxt::dynamic::tx(
                "Utility",
                "batch",
                vec![Value::unnamed_composite(vec![transfer.into_value()])],
            ))
        }
    }
}

/// Asset ids are `u32` on Asset Hub
pub fn parse_asset_id(asset_id: &str) -> Result<u32, ChainError> {
    asset_id
        .trim()
        .parse::<u32>()
        .map_err(|_| ChainError::InvalidAssetId(asset_id.to_string()))
}

fn named_field<'a, T>(value: &'a subxt::ext::scale_value::Value<T>, name: &str) -> Option<&'a subxt::ext::scale_value::Value<T>> {
    match &value.value {
        ValueDef::Composite(Composite::Named(fields)) => {
            fields.iter().find(|(field, _)| field == name).map(|(_, v)| v)
        }
        _ => None,
    }
}

/// First unsigned number in a value, looking through newtype wrappers
fn first_number<T>(value: &subxt::ext::scale_value::Value<T>) -> Option<u128> {
    match &value.value {
        ValueDef::Primitive(Primitive::U128(n)) => Some(*n),
        ValueDef::Composite(composite) => composite.values().next().and_then(first_number),
        _ => None,
    }
}

/// Bytes of a (possibly bounded) byte vector field, decoded lossily as UTF-8
fn text_field<T>(value: &subxt::ext::scale_value::Value<T>, name: &str) -> String {
    let mut bytes = Vec::new();
    if let Some(field) = named_field(value, name) {
        collect_bytes(field, &mut bytes);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn collect_bytes<T>(value: &subxt::ext::scale_value::Value<T>, out: &mut Vec<u8>) {
    match &value.value {
        ValueDef::Primitive(Primitive::U128(n)) => out.push(*n as u8),
        ValueDef::Composite(composite) => {
            for inner in composite.values() {
                collect_bytes(inner, out);
            }
        }
        _ => {}
    }
}
