//! # Domain Entities
//!
//! A claimed event, the event as observed on chain, and the reference that
//! links the two.

use serde::{Deserialize, Serialize};
use shared_types::U256;
use std::fmt;
use tb_02_deposit_ledger::Deposit;

/// Which part of a transaction an event refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputRef {
    /// UTXO output index.
    Index(u32),
    /// Account-chain address touched by the transaction (burner or contract).
    Address(String),
}

/// Pointer to an event on an external chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRef {
    /// Transaction id as the chain's node expects it.
    pub tx_id: String,
    /// Output within the transaction.
    pub output: OutputRef,
}

impl EventRef {
    /// Reference to a UTXO.
    pub fn outpoint(tx_id: impl Into<String>, vout: u32) -> Self {
        Self {
            tx_id: tx_id.into(),
            output: OutputRef::Index(vout),
        }
    }

    /// Reference to an account-chain address within a transaction.
    pub fn account(tx_id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            tx_id: tx_id.into(),
            output: OutputRef::Address(address.into()),
        }
    }
}

impl fmt::Display for EventRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.output {
            OutputRef::Index(i) => write!(f, "{}:{}", self.tx_id, i),
            OutputRef::Address(a) => write!(f, "{}_{}", self.tx_id, a),
        }
    }
}

/// What a submitter claims happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedEvent {
    pub reference: EventRef,
    pub recipient: String,
    pub amount: U256,
    /// Minimum confirmations.
    pub confirmations: u64,
}

impl ClaimedEvent {
    /// Require at least `minimum` confirmations, whatever the claim says.
    pub fn with_min_confirmations(mut self, minimum: u64) -> Self {
        self.confirmations = self.confirmations.max(minimum);
        self
    }
}

impl From<&Deposit> for ClaimedEvent {
    fn from(deposit: &Deposit) -> Self {
        let reference = match deposit {
            Deposit::OutPoint(o) => EventRef::outpoint(o.tx_id.clone(), o.vout),
            Deposit::Erc20(d) => EventRef::account(format!("0x{}", hex::encode(d.tx_id)), deposit.recipient()),
        };
        Self {
            reference,
            recipient: deposit.recipient(),
            amount: deposit.amount(),
            confirmations: deposit.confirmations(),
        }
    }
}

/// The event as reported by the external chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedEvent {
    pub recipient: String,
    pub amount: U256,
    pub confirmations: u64,
}
