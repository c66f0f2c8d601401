use serde::{Deserialize, Serialize};

use crate::chain::{format_balance, ChainInfo};
use crate::form::{BalanceView, FailureKind, SubmissionState};
use crate::session::AppPhase;
use crate::wallet::Account;

#[derive(Debug, Deserialize)]
pub struct SelectAccountRequest {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequestForm {
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub amount: String,
}

/// JSON view of the session. Balances are strings so no precision is lost.
#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<ChainInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormResponse {
    pub asset_id: String,
    pub symbol: String,
    pub decimals: u8,
    pub accounts: Vec<Account>,
    pub selected_address: String,
    pub balance: BalanceResponse,
    pub recipient: String,
    pub amount: String,
    pub submission: SubmissionResponse,
    pub status_log: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&AppPhase> for StateResponse {
    fn from(phase: &AppPhase) -> Self {
        match phase {
            AppPhase::Loading => Self {
                phase: "loading".to_string(),
                reason: None,
                form: None,
                chain: None,
            },
            AppPhase::NoWallet { reason } => Self {
                phase: "no-wallet".to_string(),
                reason: Some(reason.clone()),
                form: None,
                chain: None,
            },
            AppPhase::StartupFailed { reason } => Self {
                phase: "startup-failed".to_string(),
                reason: Some(reason.clone()),
                form: None,
                chain: None,
            },
            AppPhase::Ready { form, chain } => {
                let balance = match form.balance() {
                    BalanceView::Loading => BalanceResponse {
                        state: "loading".to_string(),
                        raw: None,
                        formatted: None,
                        reason: None,
                    },
                    BalanceView::Known(raw) => BalanceResponse {
                        state: "known".to_string(),
                        raw: Some(raw.to_string()),
                        formatted: Some(format_balance(*raw, form.asset().decimals)),
                        reason: None,
                    },
                    BalanceView::Unavailable(reason) => BalanceResponse {
                        state: "unavailable".to_string(),
                        raw: None,
                        formatted: None,
                        reason: Some(reason.clone()),
                    },
                };

                let submission = match form.submission() {
                    SubmissionState::Idle => SubmissionResponse::plain("idle"),
                    SubmissionState::Submitting => SubmissionResponse::plain("submitting"),
                    SubmissionState::Completed { block_hash } => SubmissionResponse {
                        block_hash: Some(block_hash.clone()),
                        ..SubmissionResponse::plain("completed")
                    },
                    SubmissionState::Failed { kind, reason } => SubmissionResponse {
                        failure: Some(*kind),
                        reason: Some(reason.clone()),
                        ..SubmissionResponse::plain("failed")
                    },
                };

                Self {
                    phase: "ready".to_string(),
                    reason: None,
                    form: Some(FormResponse {
                        asset_id: form.asset_id().to_string(),
                        symbol: form.asset().symbol.clone(),
                        decimals: form.asset().decimals,
                        accounts: form.accounts().to_vec(),
                        selected_address: form.selected_account().address.clone(),
                        balance,
                        recipient: form.recipient().to_string(),
                        amount: form.amount().to_string(),
                        submission,
                        status_log: form.status_log().iter().map(|l| l.message.clone()).collect(),
                    }),
                    chain: Some(chain.clone()),
                }
            }
        }
    }
}

impl SubmissionResponse {
    fn plain(state: &str) -> Self {
        Self {
            state: state.to_string(),
            block_hash: None,
            failure: None,
            reason: None,
        }
    }
}
