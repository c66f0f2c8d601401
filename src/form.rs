/// Transfer form state
///
/// Pure state machine behind the page: account selection, balance, recipient,
/// amount and the submission lifecycle. Asynchronous work (balance fetches,
/// signing, watching a transaction) is driven by `TransferSession`, which
/// feeds results back through the tickets and ids handed out here so stale
/// results can be recognised and dropped.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address;
use crate::chain::{AssetMetadata, TransferRequest, TxStatus};
use crate::error::TransferError;
use crate::wallet::Account;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "kebab-case")]
pub enum BalanceView {
    Loading,
    Known(u128),
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Rejected locally before anything was signed
    Validation,
    /// The wallet refused or failed to sign
    Signing,
    /// The chain rejected the transaction or the call failed
    Submission,
    /// No status update arrived in time
    Timeout,
    /// Cancelled by the user
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SubmissionState {
    Idle,
    Submitting,
    Completed { block_hash: String },
    Failed { kind: FailureKind, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Identifies one balance fetch. Only the latest ticket may update the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceTicket {
    pub generation: u64,
    pub address: String,
}

/// Everything needed to carry out an accepted submission
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub id: u64,
    pub request: TransferRequest,
    pub sender: Account,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferForm {
    asset_id: String,
    asset: AssetMetadata,
    accounts: Vec<Account>,
    selected: usize,
    balance: BalanceView,
    recipient: String,
    amount: String,
    submission: SubmissionState,
    status_log: Vec<StatusLine>,
    #[serde(skip)]
    balance_generation: u64,
    #[serde(skip)]
    submission_id: u64,
}

impl TransferForm {
    /// New form with the first account selected. Needs at least one account.
    pub fn new(
        asset_id: impl Into<String>,
        asset: AssetMetadata,
        accounts: Vec<Account>,
    ) -> Result<Self, TransferError> {
        if accounts.is_empty() {
            return Err(TransferError::NotReady);
        }
        Ok(Self {
            asset_id: asset_id.into(),
            asset,
            accounts,
            selected: 0,
            balance: BalanceView::Loading,
            recipient: String::new(),
            amount: String::new(),
            submission: SubmissionState::Idle,
            status_log: Vec::new(),
            balance_generation: 0,
            submission_id: 0,
        })
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn asset(&self) -> &AssetMetadata {
        &self.asset
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn selected_account(&self) -> &Account {
        &self.accounts[self.selected]
    }

    pub fn balance(&self) -> &BalanceView {
        &self.balance
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn status_log(&self) -> &[StatusLine] {
        &self.status_log
    }

    pub fn is_submitting(&self) -> bool {
        self.submission == SubmissionState::Submitting
    }

    /// Select another account and start a fresh balance fetch for it
    pub fn select_account(&mut self, address: &str) -> Result<BalanceTicket, TransferError> {
        let index = self
            .accounts
            .iter()
            .position(|account| account.address == address)
            .ok_or_else(|| TransferError::UnknownAccount(address.to_string()))?;
        self.selected = index;
        Ok(self.refresh_balance())
    }

    /// Invalidate any in-flight balance fetch and issue a ticket for a new one
    pub fn refresh_balance(&mut self) -> BalanceTicket {
        self.balance_generation += 1;
        self.balance = BalanceView::Loading;
        BalanceTicket {
            generation: self.balance_generation,
            address: self.selected_account().address.clone(),
        }
    }

    /// Apply a fetched balance. Returns `false` when the ticket is stale and
    /// the result was dropped.
    pub fn apply_balance(&mut self, ticket: &BalanceTicket, result: Result<u128, String>) -> bool {
        if ticket.generation != self.balance_generation {
            log::debug!(
                "Dropping stale balance for {} (generation {} < {})",
                ticket.address,
                ticket.generation,
                self.balance_generation
            );
            return false;
        }
        self.balance = match result {
            Ok(balance) => BalanceView::Known(balance),
            Err(reason) => BalanceView::Unavailable(reason),
        };
        true
    }

    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        self.recipient = recipient.into();
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.amount = amount.into();
    }

    /// Check the entered values and build the transfer request
    pub fn build_request(&self) -> Result<TransferRequest, TransferError> {
        let recipient = self.recipient.trim();
        if recipient.is_empty() {
            return Err(TransferError::Validation("recipient address is required".to_string()));
        }
        address::decode(recipient).map_err(|e| {
            TransferError::Validation(format!("recipient address is invalid: {}", e))
        })?;

        let amount = self.amount.trim();
        let value = amount.parse::<u128>().map_err(|_| {
            TransferError::Validation(format!("amount '{}' is not a whole number", amount))
        })?;
        if value == 0 {
            return Err(TransferError::Validation("amount must be greater than zero".to_string()));
        }

        Ok(TransferRequest {
            asset_id: self.asset_id.clone(),
            recipient_address: recipient.to_string(),
            amount: value.to_string(),
        })
    }

    /// Validate and move to `Submitting`. A validation failure is shown on
    /// the form and returned.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, TransferError> {
        if self.is_submitting() {
            return Err(TransferError::Busy);
        }

        let request = match self.build_request() {
            Ok(request) => request,
            Err(e) => {
                let reason = match &e {
                    TransferError::Validation(reason) => reason.clone(),
                    other => other.to_string(),
                };
                self.submission = SubmissionState::Failed {
                    kind: FailureKind::Validation,
                    reason,
                };
                return Err(e);
            }
        };

        self.submission_id += 1;
        self.submission = SubmissionState::Submitting;
        self.status_log.clear();
        self.log_status(format!(
            "Sending {} of asset {} to {}",
            request.amount, request.asset_id, request.recipient_address
        ));

        Ok(PendingSubmission {
            id: self.submission_id,
            request,
            sender: self.selected_account().clone(),
        })
    }

    /// Record a status update of submission `id`. Returns `true` once the
    /// submission reached a final state.
    pub fn record_status(&mut self, id: u64, status: &TxStatus) -> bool {
        if !self.owns(id) {
            return true;
        }
        self.log_status(status.to_string());

        if let Some(block_hash) = status.included_in() {
            self.submission = SubmissionState::Completed {
                block_hash: block_hash.to_string(),
            };
            return true;
        }
        if let Some(reason) = status.failure_reason() {
            self.submission = SubmissionState::Failed {
                kind: FailureKind::Submission,
                reason,
            };
            return true;
        }
        false
    }

    /// End submission `id` with a failure. Ignored if it already ended.
    pub fn fail_submission(&mut self, id: u64, kind: FailureKind, reason: impl Into<String>) {
        if !self.owns(id) {
            return;
        }
        let reason = reason.into();
        self.log_status(format!(":( transaction failed: {}", reason));
        self.submission = SubmissionState::Failed { kind, reason };
    }

    /// Cancel the in-flight submission, returning its id
    pub fn cancel_submission(&mut self) -> Result<u64, TransferError> {
        if !self.is_submitting() {
            return Err(TransferError::NothingToCancel);
        }
        let id = self.submission_id;
        self.fail_submission(id, FailureKind::Cancelled, "cancelled by user");
        Ok(id)
    }

    fn owns(&self, id: u64) -> bool {
        id == self.submission_id && self.is_submitting()
    }

    fn log_status(&mut self, message: String) {
        log::info!("{}", message);
        self.status_log.push(StatusLine {
            at: Utc::now(),
            message,
        });
    }
}
