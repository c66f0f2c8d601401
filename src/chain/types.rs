// Chain-facing request/response types

use serde::{Deserialize, Serialize};

/// Runtime details of the connected chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub spec_name: String,
    pub spec_version: u32,
    /// XCM version the chain considers safe to send, if it speaks XCM
    pub safe_xcm_version: Option<u32>,
    /// Parachain id of the chain, if it is a parachain
    pub parachain_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// A transfer as entered by the user, after local validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub asset_id: String,
    pub recipient_address: String,
    /// Amount in the asset's smallest unit
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum TransferMode {
    /// A single keep-alive asset transfer extrinsic
    Direct,
    /// The transfer call wrapped in a utility batch, addressed to a
    /// destination chain
    BatchedCrossChain { destination: String },
}

/// Asset used to pay transaction fees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeePayment {
    /// The chain's native token
    Native,
    /// The asset being transferred, so senders need no native balance
    TransferAsset,
}

/// Progress of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "kebab-case")]
pub enum TxStatus {
    Validated,
    Broadcast,
    InBlock { block_hash: String },
    Finalized { block_hash: String },
    /// The block holding the transaction left the best chain
    Retracted,
    Dropped(String),
    Invalid(String),
    /// Included, but the call itself failed
    DispatchFailed { block_hash: String, reason: String },
    Error(String),
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Validated | Self::Broadcast | Self::Retracted)
    }

    /// Block hash of a successful inclusion
    pub fn included_in(&self) -> Option<&str> {
        match self {
            Self::InBlock { block_hash } | Self::Finalized { block_hash } => Some(block_hash),
            _ => None,
        }
    }

    /// Reason of a terminal failure
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Dropped(reason) => Some(format!("dropped: {}", reason)),
            Self::Invalid(reason) => Some(format!("invalid: {}", reason)),
            Self::Error(reason) => Some(reason.clone()),
            Self::DispatchFailed { block_hash, reason } => {
                Some(format!("failed in block {}: {}", block_hash, reason))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InBlock { block_hash } => write!(f, "Completed at block hash #{}", block_hash),
            Self::Finalized { block_hash } => write!(f, "Finalized at block hash #{}", block_hash),
            Self::Validated => write!(f, "Current status: validated"),
            Self::Broadcast => write!(f, "Current status: broadcast"),
            Self::Retracted => write!(f, "Current status: retracted"),
            other => match other.failure_reason() {
                Some(reason) => write!(f, "Transaction failed: {}", reason),
                None => write!(f, "Current status: {:?}", other),
            },
        }
    }
}

/// Render a raw balance with the asset's decimals, e.g. `1500000` with 6
/// decimals is `1.500000`
pub fn format_balance(raw: u128, decimals: u8) -> String {
    let digits = raw.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    format!("{}.{}", whole, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_balance() {
        assert_eq!(format_balance(1_500_000, 6), "1.500000");
        assert_eq!(format_balance(500, 0), "500");
        assert_eq!(format_balance(5, 3), "0.005");
        assert_eq!(format_balance(0, 2), "0.00");
    }

    #[test]
    fn test_format_balance_keeps_full_precision() {
        // Larger than any single machine word
        let raw = u128::MAX;
        assert_eq!(format_balance(raw, 0), "340282366920938463463374607431768211455");
        assert_eq!(
            format_balance(raw, 10),
            "34028236692093846346337460743.1768211455"
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!TxStatus::Validated.is_terminal());
        assert!(!TxStatus::Broadcast.is_terminal());
        assert!(!TxStatus::Retracted.is_terminal());
        assert!(TxStatus::InBlock { block_hash: "0x01".into() }.is_terminal());
        assert!(TxStatus::Dropped("pool full".into()).is_terminal());
        assert_eq!(
            TxStatus::Finalized { block_hash: "0x02".into() }.included_in(),
            Some("0x02")
        );
    }

    #[test]
    fn test_status_lines() {
        let status = TxStatus::InBlock { block_hash: "0xabc".into() };
        assert_eq!(status.to_string(), "Completed at block hash #0xabc");
        assert_eq!(
            TxStatus::Invalid("bad nonce".into()).to_string(),
            "Transaction failed: invalid: bad nonce"
        );
    }
}
