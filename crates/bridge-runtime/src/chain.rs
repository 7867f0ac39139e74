//! # Chain Dispatch
//!
//! Per-chain behaviour selected by chain name. Bitcoin is a UTXO chain with
//! public-key deposit addresses; every configured EVM chain uses burner
//! contracts and EIP-155 signing.

use bitcoin::Network;

/// Chain family with its verification parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainAdapter {
    Bitcoin { network: Network, confirmations: u64 },
    Evm { chain_id: u64, confirmations: u64 },
}

impl ChainAdapter {
    /// Confirmations every claim on this chain must have at least.
    pub fn min_confirmations(&self) -> u64 {
        match self {
            ChainAdapter::Bitcoin { confirmations, .. } | ChainAdapter::Evm { confirmations, .. } => {
                *confirmations
            }
        }
    }

    pub fn is_bitcoin(&self) -> bool {
        matches!(self, ChainAdapter::Bitcoin { .. })
    }

    /// Label used in poll ids and logs.
    pub fn family(&self) -> &'static str {
        match self {
            ChainAdapter::Bitcoin { .. } => "bitcoin",
            ChainAdapter::Evm { .. } => "evm",
        }
    }
}
