//! SS58 address codec and account address formatting
//!
//! Substrate addresses are `base58(prefix || account || checksum)` where the
//! checksum is the first two bytes of `blake2b_512("SS58PRE" || prefix || account)`.
//! Prefixes below 64 take one byte, prefixes up to 16383 take two.

use blake2::{Blake2b512, Digest};
use serde::{Deserialize, Serialize};

use crate::error::AddressError;
use crate::wallet::Account;

/// Generic Substrate prefix, used by the keystore before formatting
pub const GENERIC_SUBSTRATE_PREFIX: u16 = 42;

/// Polkadot relay chain and Asset Hub prefix
pub const POLKADOT_PREFIX: u16 = 0;

const CHECKSUM_PREFIX: &[u8] = b"SS58PRE";
const CHECKSUM_LEN: usize = 2;
const ACCOUNT_LEN: usize = 32;
const MAX_PREFIX: u16 = 16_383;

/// How account addresses are presented and submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressEncoding {
    /// Keep addresses exactly as the wallet reported them
    Passthrough,
    /// Re-encode addresses with the given SS58 network prefix
    Network(u16),
}

impl std::fmt::Display for AddressEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passthrough => write!(f, "passthrough"),
            Self::Network(prefix) => write!(f, "ss58 prefix {}", prefix),
        }
    }
}

/// Decode an SS58 address into its network prefix and 32-byte account id
pub fn decode(address: &str) -> Result<(u16, [u8; ACCOUNT_LEN]), AddressError> {
    let data = bs58::decode(address)
        .into_vec()
        .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;

    let first = *data.first().ok_or(AddressError::InvalidLength(0))?;
    let (prefix, prefix_len) = match first {
        0..=63 => (first as u16, 1),
        64..=127 => {
            let second = *data.get(1).ok_or(AddressError::InvalidLength(data.len()))?;
            let lower = (first << 2) | (second >> 6);
            let upper = second & 0b0011_1111;
            (lower as u16 | ((upper as u16) << 8), 2)
        }
        _ => return Err(AddressError::InvalidPrefix(first as u16)),
    };

    if data.len() != prefix_len + ACCOUNT_LEN + CHECKSUM_LEN {
        return Err(AddressError::InvalidLength(data.len()));
    }

    let body_len = prefix_len + ACCOUNT_LEN;
    let hash = checksum(&data[..body_len]);
    if data[body_len..] != hash[..CHECKSUM_LEN] {
        return Err(AddressError::BadChecksum);
    }

    let mut account = [0u8; ACCOUNT_LEN];
    account.copy_from_slice(&data[prefix_len..body_len]);
    Ok((prefix, account))
}

/// Encode a 32-byte account id with the given network prefix
pub fn encode(account: &[u8; ACCOUNT_LEN], prefix: u16) -> Result<String, AddressError> {
    let mut data = match prefix {
        0..=63 => vec![prefix as u8],
        64..=MAX_PREFIX => {
            let first = ((prefix & 0b0000_0000_1111_1100) >> 2) as u8 | 0b0100_0000;
            let second = (prefix >> 8) as u8 | ((prefix & 0b0000_0000_0000_0011) << 6) as u8;
            vec![first, second]
        }
        _ => return Err(AddressError::InvalidPrefix(prefix)),
    };
    data.extend_from_slice(account);

    let hash = checksum(&data);
    data.extend_from_slice(&hash[..CHECKSUM_LEN]);

    Ok(bs58::encode(data).into_string())
}

/// Account id behind an address, whatever network it is encoded for
pub fn account_id(address: &str) -> Result<[u8; ACCOUNT_LEN], AddressError> {
    decode(address).map(|(_, account)| account)
}

/// Re-encode an address for another network. The account id is unchanged.
pub fn reencode(address: &str, prefix: u16) -> Result<String, AddressError> {
    let (_, account) = decode(address)?;
    encode(&account, prefix)
}

/// Apply the configured encoding to every account.
///
/// `Passthrough` returns the accounts untouched. Addresses that cannot be
/// decoded are kept as they are.
pub fn format_accounts(accounts: Vec<Account>, encoding: AddressEncoding) -> Vec<Account> {
    let prefix = match encoding {
        AddressEncoding::Passthrough => return accounts,
        AddressEncoding::Network(prefix) => prefix,
    };

    accounts
        .into_iter()
        .map(|account| match reencode(&account.address, prefix) {
            Ok(address) => Account { address, ..account },
            Err(e) => {
                log::warn!(
                    "Keeping address {} unformatted: {}",
                    account.address,
                    e
                );
                account
            }
        })
        .collect()
}

fn checksum(body: &[u8]) -> Vec<u8> {
    let mut hasher = Blake2b512::new();
    hasher.update(CHECKSUM_PREFIX);
    hasher.update(body);
    hasher.finalize().to_vec()
}
