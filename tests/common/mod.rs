//! Shared test doubles: an in-memory wallet, a scripted chain and helpers to
//! drive a `TransferSession` until it reaches a given state.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use asset_transfer::chain::TxStatusStream;
use asset_transfer::{
    Account, AppConfig, AppPhase, AssetMetadata, ChainClient, ChainConnector, ChainError,
    ChainInfo, FeePayment, NetworkPreset, TransactionSigner, TransferMode, TransferRequest, TransferSession,
    TxStatus, WalletBridge, WalletError, WalletSignature, WalletSource,
};

pub const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
pub const BOB: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";
pub const ALICE_POLKADOT: &str = "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn joe() -> AssetMetadata {
    AssetMetadata {
        name: "Joe".to_string(),
        symbol: "JOE".to_string(),
        decimals: 2,
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::for_preset(NetworkPreset::Westmint);
    config.submission_timeout = Duration::from_secs(5);
    config.bind_address = "127.0.0.1:0".to_string();
    config
}

// ============================================================================
// Wallet
// ============================================================================

pub struct MockWallet {
    pub sources: Vec<WalletSource>,
    pub accounts: Vec<Account>,
    /// Reason the signer refuses to sign, if any
    pub reject: Option<String>,
    pub signed: Arc<Mutex<Vec<String>>>,
}

impl MockWallet {
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            sources: vec![WalletSource {
                name: "mock".to_string(),
                version: "1.0.0".to_string(),
            }],
            accounts,
            reject: None,
            signed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Alice and Bob, both managed by the "mock" source
    pub fn alice_and_bob() -> Self {
        Self::with_accounts(vec![
            Account::new(ALICE, "mock", "Alice"),
            Account::new(BOB, "mock", "Bob"),
        ])
    }

    pub fn without_sources() -> Self {
        Self {
            sources: Vec::new(),
            ..Self::with_accounts(Vec::new())
        }
    }

    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject = Some(reason.to_string());
        self
    }

    pub fn signed_by(&self) -> Vec<String> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletBridge for MockWallet {
    async fn enable(&self, _app_name: &str) -> Result<Vec<WalletSource>, WalletError> {
        Ok(self.sources.clone())
    }

    async fn accounts(&self, source: &str) -> Result<Vec<Account>, WalletError> {
        Ok(self
            .accounts
            .iter()
            .filter(|account| account.meta.source == source)
            .cloned()
            .collect())
    }

    async fn signer(&self, _source: &str) -> Result<Arc<dyn TransactionSigner>, WalletError> {
        Ok(Arc::new(MockSigner {
            reject: self.reject.clone(),
            signed: self.signed.clone(),
        }))
    }
}

struct MockSigner {
    reject: Option<String>,
    signed: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl TransactionSigner for MockSigner {
    async fn sign(&self, address: &str, _payload: &[u8]) -> Result<WalletSignature, WalletError> {
        if let Some(reason) = &self.reject {
            return Err(WalletError::Rejected(reason.clone()));
        }
        self.signed.lock().unwrap().push(address.to_string());
        Ok(WalletSignature::Sr25519([7u8; 64]))
    }
}

// ============================================================================
// Chain
// ============================================================================

/// How the chain answers a submission
#[derive(Clone)]
pub enum Script {
    /// Emit these statuses, then end the stream
    Statuses(Vec<TxStatus>),
    /// Accept the transaction but never report a status
    Silent,
    /// Refuse the submission
    Fail(ChainError),
}

pub struct MockChain {
    pub assets: HashMap<String, AssetMetadata>,
    /// Balance and response delay per address
    pub balances: HashMap<String, (u128, Duration)>,
    pub script: Mutex<Script>,
    pub submitted: Mutex<Vec<(TransferRequest, TransferMode, FeePayment)>>,
}

impl MockChain {
    pub fn new(script: Script) -> Self {
        let mut assets = HashMap::new();
        assets.insert("8".to_string(), joe());
        Self {
            assets,
            balances: HashMap::new(),
            script: Mutex::new(script),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_balance(mut self, address: &str, balance: u128, delay: Duration) -> Self {
        self.balances.insert(address.to_string(), (balance, delay));
        self
    }

    pub fn with_asset(mut self, asset_id: &str, metadata: AssetMetadata) -> Self {
        self.assets.insert(asset_id.to_string(), metadata);
        self
    }

    pub fn submitted(&self) -> Vec<(TransferRequest, TransferMode, FeePayment)> {
        self.submitted.lock().unwrap().clone()
    }
}

pub fn included(block_hash: &str) -> Script {
    Script::Statuses(vec![
        TxStatus::Validated,
        TxStatus::Broadcast,
        TxStatus::InBlock {
            block_hash: block_hash.to_string(),
        },
    ])
}

#[async_trait]
impl ChainClient for MockChain {
    fn info(&self) -> ChainInfo {
        ChainInfo {
            spec_name: "westmint".to_string(),
            spec_version: 9435,
            safe_xcm_version: Some(3),
            parachain_id: Some(1000),
        }
    }

    async fn asset_metadata(&self, asset_id: &str) -> Result<AssetMetadata, ChainError> {
        self.assets
            .get(asset_id)
            .cloned()
            .ok_or_else(|| ChainError::UnknownAsset(asset_id.to_string()))
    }

    async fn asset_balance(&self, _asset_id: &str, address: &str) -> Result<u128, ChainError> {
        let (balance, delay) = self
            .balances
            .get(address)
            .cloned()
            .unwrap_or((0, Duration::ZERO));
        tokio::time::sleep(delay).await;
        Ok(balance)
    }

    async fn submit_transfer(
        &self,
        request: &TransferRequest,
        mode: &TransferMode,
        fee: FeePayment,
        sender: &Account,
        signer: Arc<dyn TransactionSigner>,
    ) -> Result<TxStatusStream, ChainError> {
        signer
            .sign(&sender.address, b"signer payload")
            .await
            .map_err(|e| ChainError::Signing(e.to_string()))?;

        self.submitted
            .lock()
            .unwrap()
            .push((request.clone(), mode.clone(), fee));

        let script = self.script.lock().unwrap().clone();
        match script {
            Script::Statuses(statuses) => Ok(futures::stream::iter(statuses).boxed()),
            Script::Silent => Ok(futures::stream::pending::<TxStatus>().boxed()),
            Script::Fail(e) => Err(e),
        }
    }
}

/// Hands out one shared `MockChain`, or fails to connect
pub struct MockConnector {
    pub chain: Arc<MockChain>,
    pub fail: Option<String>,
}

impl MockConnector {
    pub fn new(chain: Arc<MockChain>) -> Self {
        Self { chain, fail: None }
    }

    pub fn failing(chain: Arc<MockChain>, reason: &str) -> Self {
        Self {
            chain,
            fail: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl ChainConnector for MockConnector {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn ChainClient>, ChainError> {
        if let Some(reason) = &self.fail {
            return Err(ChainError::connection(endpoint, reason));
        }
        let chain: Arc<dyn ChainClient> = self.chain.clone();
        Ok(chain)
    }
}

// ============================================================================
// Session helpers
// ============================================================================

/// Session initialized against the given doubles
pub async fn ready_session(
    config: AppConfig,
    wallet: Arc<MockWallet>,
    chain: Arc<MockChain>,
) -> TransferSession {
    let session = TransferSession::new(config);
    session
        .initialize(wallet, Arc::new(MockConnector::new(chain)))
        .await;
    session
}

/// Poll the session until `done` holds, panicking after a few seconds
pub async fn wait_for<F>(session: &TransferSession, done: F) -> AppPhase
where
    F: Fn(&AppPhase) -> bool,
{
    for _ in 0..300 {
        let phase = session.snapshot().await;
        if done(&phase) {
            return phase;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session did not reach the expected state: {:?}", session.snapshot().await);
}

pub fn form_of(phase: &AppPhase) -> &asset_transfer::TransferForm {
    match phase {
        AppPhase::Ready { form, .. } => form,
        other => panic!("form not ready: {:?}", other),
    }
}
