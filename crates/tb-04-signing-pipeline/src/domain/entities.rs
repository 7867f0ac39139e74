//! # Domain Entities
//!
//! ## Clusters
//!
//! - **Transactions**: `EvmTransaction`, `UnsignedTx`, `SignedTransaction`
//! - **Pipeline**: `PipelineState`, `PipelineRecord`, `SpendInfo`

use bitcoin::Transaction;
use serde::{Deserialize, Serialize};
use shared_types::{Address, ChainName, Hash, KeyId, U256};
use std::fmt;
use tb_02_deposit_ledger::DepositId;

// =============================================================================
// CLUSTER A: TRANSACTIONS
// =============================================================================

/// A legacy (pre-EIP-2718) EVM transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    /// Deposits this transaction settles. Each must be Verified or
    /// Confirmed before the transaction is accepted.
    pub deposits: Vec<DepositId>,
}

/// A transaction awaiting signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsignedTx {
    /// Segwit v0 spend of deposit outpoints.
    Bitcoin(#[serde(with = "consensus_bytes")] Transaction),
    /// EVM legacy transaction.
    Evm(EvmTransaction),
}

impl UnsignedTx {
    /// Deposits spent or settled by this transaction.
    pub fn input_ids(&self) -> Vec<DepositId> {
        match self {
            UnsignedTx::Bitcoin(tx) => tx
                .input
                .iter()
                .map(|txin| {
                    DepositId::outpoint(&txin.previous_output.txid.to_string(), txin.previous_output.vout)
                })
                .collect(),
            UnsignedTx::Evm(tx) => tx.deposits.clone(),
        }
    }

    pub fn is_bitcoin(&self) -> bool {
        matches!(self, UnsignedTx::Bitcoin(_))
    }
}

/// A fully signed transaction ready for broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Pipeline id.
    pub id: String,
    /// Chain it is valid on.
    pub chain: ChainName,
    /// Network serialization (consensus bytes or signed RLP).
    pub raw: Vec<u8>,
    /// Chain-native transaction hash, hex.
    pub tx_hash: String,
}

// =============================================================================
// CLUSTER B: PIPELINE
// =============================================================================

/// Pipeline state of one transaction id.
///
/// ```text
/// Unsigned → HashComputed → SigningRequested → Signed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineState {
    Unsigned,
    HashComputed,
    SigningRequested,
    Signed,
}

impl PipelineState {
    /// Content may be replaced only before a signature is requested.
    pub fn is_locked(&self) -> bool {
        *self >= PipelineState::SigningRequested
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Unsigned => "Unsigned",
            PipelineState::HashComputed => "HashComputed",
            PipelineState::SigningRequested => "SigningRequested",
            PipelineState::Signed => "Signed",
        };
        f.write_str(s)
    }
}

/// What spending a Bitcoin deposit needs beyond the transaction itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendInfo {
    /// Witness script of the deposit address.
    pub witness_script: Vec<u8>,
    /// Value of the spent output in satoshis.
    pub amount: u64,
}

/// Persisted pipeline state. Stored under `unsigned_<id>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub tx: UnsignedTx,
    pub state: PipelineState,
    /// Signing hash, once computed.
    pub hash: Option<Hash>,
    /// Key the signature was requested from.
    pub key_id: Option<KeyId>,
    /// Bitcoin spend data captured with the hash.
    pub spend: Option<SpendInfo>,
}

impl PipelineRecord {
    /// Fresh record for `tx`.
    pub fn new(tx: UnsignedTx) -> Self {
        Self {
            tx,
            state: PipelineState::Unsigned,
            hash: None,
            key_id: None,
            spend: None,
        }
    }
}

/// Bitcoin transactions are stored in consensus encoding.
mod consensus_bytes {
    use bitcoin::consensus::encode;
    use bitcoin::Transaction;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(tx: &Transaction, serializer: S) -> Result<S::Ok, S::Error> {
        encode::serialize(tx).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Transaction, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        encode::deserialize(&bytes).map_err(serde::de::Error::custom)
    }
}
