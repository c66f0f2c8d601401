/// Transfer session - orchestration layer
///
/// Owns the application phase (loading, no wallet, startup failure, ready
/// form) and the collaborators handed over by startup. Balance fetches and
/// transaction watching run as background tasks that publish their results
/// back into the form.
use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::chain::{ChainClient, ChainConnector, ChainInfo};
use crate::config::AppConfig;
use crate::error::{ChainError, TransferError};
use crate::form::{BalanceTicket, FailureKind, PendingSubmission, TransferForm};
use crate::startup::{self, StartupOutcome};
use crate::wallet::WalletBridge;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum AppPhase {
    Loading,
    NoWallet { reason: String },
    StartupFailed { reason: String },
    Ready { form: TransferForm, chain: ChainInfo },
}

struct Shared {
    phase: AppPhase,
    chain: Option<Arc<dyn ChainClient>>,
    wallet: Option<Arc<dyn WalletBridge>>,
    balance_task: Option<JoinHandle<()>>,
    submission_task: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct TransferSession {
    config: Arc<AppConfig>,
    shared: Arc<Mutex<Shared>>,
}

impl TransferSession {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            shared: Arc::new(Mutex::new(Shared {
                phase: AppPhase::Loading,
                chain: None,
                wallet: None,
                balance_task: None,
                submission_task: None,
            })),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the startup sequence and publish its outcome
    pub async fn initialize(&self, wallet: Arc<dyn WalletBridge>, connector: Arc<dyn ChainConnector>) {
        let outcome = startup::initialize(&self.config, wallet.as_ref(), connector.as_ref()).await;

        let mut shared = self.shared.lock().await;
        match outcome {
            Ok(StartupOutcome::Ready(ready)) => {
                match TransferForm::new(self.config.asset_id.clone(), ready.asset, ready.accounts) {
                    Ok(form) => {
                        shared.phase = AppPhase::Ready {
                            form,
                            chain: ready.chain.info(),
                        };
                        shared.chain = Some(ready.chain);
                        shared.wallet = Some(wallet);
                        self.refresh_balance(&mut shared);
                        log::info!("✅ Ready to transfer");
                    }
                    Err(e) => {
                        shared.phase = AppPhase::StartupFailed {
                            reason: e.to_string(),
                        }
                    }
                }
            }
            Ok(StartupOutcome::NoWallet(reason)) => {
                shared.phase = AppPhase::NoWallet { reason };
            }
            Err(e) => {
                log::error!("❌ Startup failed: {}", e);
                shared.phase = AppPhase::StartupFailed {
                    reason: e.to_string(),
                };
            }
        }
    }

    /// Current phase, including a copy of the form
    pub async fn snapshot(&self) -> AppPhase {
        self.shared.lock().await.phase.clone()
    }

    pub async fn select_account(&self, address: &str) -> Result<(), TransferError> {
        let mut shared = self.shared.lock().await;
        let ticket = form_mut(&mut shared.phase)?.select_account(address)?;
        log::info!("Selected account {}", address);
        self.fetch_balance(&mut shared, ticket);
        Ok(())
    }

    pub async fn set_recipient(&self, recipient: &str) -> Result<(), TransferError> {
        let mut shared = self.shared.lock().await;
        form_mut(&mut shared.phase)?.set_recipient(recipient);
        Ok(())
    }

    pub async fn set_amount(&self, amount: &str) -> Result<(), TransferError> {
        let mut shared = self.shared.lock().await;
        form_mut(&mut shared.phase)?.set_amount(amount);
        Ok(())
    }

    /// Validate the form and start signing and submitting in the background
    pub async fn submit(&self) -> Result<(), TransferError> {
        let mut shared = self.shared.lock().await;
        let (Some(chain), Some(wallet)) = (shared.chain.clone(), shared.wallet.clone()) else {
            return Err(TransferError::NotReady);
        };
        let pending = form_mut(&mut shared.phase)?.begin_submission()?;

        let session = self.clone();
        shared.submission_task = Some(tokio::spawn(async move {
            session.run_submission(pending, chain, wallet).await;
        }));
        Ok(())
    }

    /// Stop watching the in-flight submission
    pub async fn cancel(&self) -> Result<(), TransferError> {
        let mut shared = self.shared.lock().await;
        let id = form_mut(&mut shared.phase)?.cancel_submission()?;
        if let Some(task) = shared.submission_task.take() {
            task.abort();
        }
        log::warn!("Submission {} cancelled", id);
        Ok(())
    }

    async fn run_submission(
        &self,
        pending: PendingSubmission,
        chain: Arc<dyn ChainClient>,
        wallet: Arc<dyn WalletBridge>,
    ) {
        let id = pending.id;
        let timeout = self.config.submission_timeout;

        let signer = match wallet.signer(&pending.sender.meta.source).await {
            Ok(signer) => signer,
            Err(e) => return self.fail(id, FailureKind::Signing, e.to_string()).await,
        };

        let submitted = tokio::time::timeout(
            timeout,
            chain.submit_transfer(
                &pending.request,
                &self.config.transfer_mode,
                self.config.fee_payment,
                &pending.sender,
                signer,
            ),
        )
        .await;
        let mut statuses = match submitted {
            Err(_) => {
                let reason = format!("no response from the chain within {:?}", timeout);
                return self.fail(id, FailureKind::Timeout, reason).await;
            }
            Ok(Err(ChainError::Signing(reason))) => {
                return self.fail(id, FailureKind::Signing, reason).await
            }
            Ok(Err(e)) => return self.fail(id, FailureKind::Submission, e.to_string()).await,
            Ok(Ok(statuses)) => statuses,
        };

        loop {
            match tokio::time::timeout(timeout, statuses.next()).await {
                Err(_) => {
                    let reason = format!("no status update within {:?}", timeout);
                    return self.fail(id, FailureKind::Timeout, reason).await;
                }
                Ok(None) => {
                    let reason = "status updates ended before the transfer was included";
                    return self.fail(id, FailureKind::Submission, reason).await;
                }
                Ok(Some(status)) => {
                    let mut shared = self.shared.lock().await;
                    let Ok(form) = form_mut(&mut shared.phase) else {
                        return;
                    };
                    if form.record_status(id, &status) {
                        if status.included_in().is_some() {
                            self.refresh_balance(&mut shared);
                        }
                        return;
                    }
                }
            }
        }
    }

    async fn fail(&self, id: u64, kind: FailureKind, reason: impl Into<String>) {
        let mut shared = self.shared.lock().await;
        if let Ok(form) = form_mut(&mut shared.phase) {
            form.fail_submission(id, kind, reason);
        }
    }

    fn refresh_balance(&self, shared: &mut Shared) {
        if let Ok(form) = form_mut(&mut shared.phase) {
            let ticket = form.refresh_balance();
            self.fetch_balance(shared, ticket);
        }
    }

    /// Fetch the balance for `ticket`, superseding any fetch still running
    fn fetch_balance(&self, shared: &mut Shared, ticket: BalanceTicket) {
        let Some(chain) = shared.chain.clone() else {
            return;
        };
        if let Some(task) = shared.balance_task.take() {
            task.abort();
        }

        let state = self.shared.clone();
        let asset_id = self.config.asset_id.clone();
        shared.balance_task = Some(tokio::spawn(async move {
            let result = chain
                .asset_balance(&asset_id, &ticket.address)
                .await
                .map_err(|e| e.to_string());
            if let Err(reason) = &result {
                log::warn!("Balance of {} unavailable: {}", ticket.address, reason);
            }

            let mut shared = state.lock().await;
            if let Ok(form) = form_mut(&mut shared.phase) {
                form.apply_balance(&ticket, result);
            }
        }));
    }
}

fn form_mut(phase: &mut AppPhase) -> Result<&mut TransferForm, TransferError> {
    match phase {
        AppPhase::Ready { form, .. } => Ok(form),
        _ => Err(TransferError::NotReady),
    }
}
