//! # Domain Entities
//!
//! ## Clusters
//!
//! - **Deposits**: `OutPointInfo`, `Erc20Deposit`, `Deposit`, `DepositId`
//! - **Lifecycle**: `DepositState`
//! - **Token deployments**: `TokenDeployment`

use super::errors::LedgerError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, U256};
use std::fmt;

// =============================================================================
// CLUSTER A: DEPOSITS
// =============================================================================

/// A Bitcoin UTXO claimed to pay a deposit address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutPointInfo {
    /// Transaction id (hex, display byte order).
    pub tx_id: String,
    /// Output index.
    pub vout: u32,
    /// Deposit address the output pays.
    pub recipient: String,
    /// Amount in satoshis.
    pub amount: u64,
    /// Confirmations the claim requires.
    pub confirmations: u64,
}

/// A token transfer to a burner address on an EVM chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erc20Deposit {
    /// Transaction hash.
    pub tx_id: Hash,
    /// Burner address that received the tokens.
    pub burner_address: Address,
    /// Token amount in base units.
    pub amount: U256,
    /// Token symbol.
    pub symbol: String,
    /// Confirmations the claim requires.
    pub confirmations: u64,
}

/// One external-chain transfer. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deposit {
    /// Bitcoin outpoint.
    OutPoint(OutPointInfo),
    /// EVM token deposit.
    Erc20(Erc20Deposit),
}

impl Deposit {
    /// Ledger identifier.
    pub fn id(&self) -> DepositId {
        match self {
            Deposit::OutPoint(o) => DepositId::outpoint(&o.tx_id, o.vout),
            Deposit::Erc20(d) => DepositId::erc20(&d.tx_id, &d.burner_address),
        }
    }

    /// Deposit address the funds were sent to.
    pub fn recipient(&self) -> String {
        match self {
            Deposit::OutPoint(o) => o.recipient.clone(),
            Deposit::Erc20(d) => format!("0x{}", hex::encode(d.burner_address)),
        }
    }

    /// Claimed amount.
    pub fn amount(&self) -> U256 {
        match self {
            Deposit::OutPoint(o) => U256::from(o.amount),
            Deposit::Erc20(d) => d.amount,
        }
    }

    /// Claimed confirmations.
    pub fn confirmations(&self) -> u64 {
        match self {
            Deposit::OutPoint(o) => o.confirmations,
            Deposit::Erc20(d) => d.confirmations,
        }
    }

    /// Asset moved: `satoshi` for Bitcoin, the token symbol otherwise.
    pub fn asset(&self) -> &str {
        match self {
            Deposit::OutPoint(_) => "satoshi",
            Deposit::Erc20(d) => &d.symbol,
        }
    }

    /// Token deposits go through Confirmed and Burned.
    pub fn is_tokenized(&self) -> bool {
        matches!(self, Deposit::Erc20(_))
    }

    /// The deposit as the ledger stores it: a Bitcoin tx id is rewritten to
    /// lower-case hex, and one that is not 32 bytes of hex is refused.
    pub fn canonical(&self) -> Result<Deposit, LedgerError> {
        match self {
            Deposit::OutPoint(o) => {
                let tx_id = canonical_tx_id(&o.tx_id)
                    .ok_or_else(|| LedgerError::InvalidDeposit(format!("malformed tx id {:?}", o.tx_id)))?;
                Ok(Deposit::OutPoint(OutPointInfo { tx_id, ..o.clone() }))
            }
            Deposit::Erc20(_) => Ok(self.clone()),
        }
    }
}

/// Lower-case hex of a 32-byte transaction id, `None` if `tx_id` is not one.
pub fn canonical_tx_id(tx_id: &str) -> Option<String> {
    let bytes = hex::decode(tx_id).ok()?;
    (bytes.len() == 32).then(|| hex::encode(bytes))
}

/// Deposit identifier: `txid:vout` or `0x<txid>_0x<burner>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepositId(String);

impl DepositId {
    /// Id of a Bitcoin outpoint. Hex case does not matter.
    pub fn outpoint(tx_id: &str, vout: u32) -> Self {
        Self(format!("{}:{}", tx_id.to_ascii_lowercase(), vout))
    }

    /// Id of a token deposit.
    pub fn erc20(tx_id: &Hash, burner: &Address) -> Self {
        Self(format!("0x{}_0x{}", hex::encode(tx_id), hex::encode(burner)))
    }

    /// Wrap an id string as stored.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DepositId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CLUSTER B: LIFECYCLE
// =============================================================================

/// Deposit lifecycle state.
///
/// ```text
/// Unverified ──true──→ Verified ──→ Confirmed ──→ Burned   (tokens)
///     │
///     └──false──→ Rejected (record deleted)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositState {
    Unverified,
    Verified,
    Rejected,
    Confirmed,
    Burned,
}

impl DepositState {
    /// Verified and Confirmed deposits may be spent by an outgoing transaction.
    pub fn is_spendable(&self) -> bool {
        matches!(self, DepositState::Verified | DepositState::Confirmed)
    }
}

impl fmt::Display for DepositState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DepositState::Unverified => "Unverified",
            DepositState::Verified => "Verified",
            DepositState::Rejected => "Rejected",
            DepositState::Confirmed => "Confirmed",
            DepositState::Burned => "Burned",
        };
        f.write_str(s)
    }
}

// =============================================================================
// CLUSTER C: TOKEN DEPLOYMENTS
// =============================================================================

/// A claimed token deployment awaiting its poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDeployment {
    /// Deployment transaction hash.
    pub tx_id: Hash,
    /// Symbol of the deployed token.
    pub symbol: String,
}
