//! # Domain Entities

use serde::{Deserialize, Serialize};
use shared_types::{CrossChainAddress, U256};
use std::fmt;

/// Whether a transfer still has to be executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferState {
    Pending,
    Archived,
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferState::Pending => f.write_str("Pending"),
            TransferState::Archived => f.write_str("Archived"),
        }
    }
}

/// Value received at a linked deposit address, owed to its recipient.
///
/// Stored in the recipient chain's namespace; `id` is unique per
/// destination chain and increases with every enqueue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainTransfer {
    pub id: u64,
    /// Address the funds arrived at.
    pub deposit_address: CrossChainAddress,
    /// Where they are owed.
    pub recipient: CrossChainAddress,
    pub amount: U256,
    /// `satoshi` or a token symbol.
    pub asset: String,
    pub state: TransferState,
}

impl CrossChainTransfer {
    pub fn is_pending(&self) -> bool {
        self.state == TransferState::Pending
    }
}
