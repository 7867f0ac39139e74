//! # Value Objects
//!
//! Pipeline parameters and storage key layout.

use shared_types::ChainName;
use std::collections::HashMap;

/// Pipeline parameters, fixed at construction.
#[derive(Clone, Debug, Default)]
pub struct PipelineConfig {
    /// EIP-155 chain id per EVM chain.
    pub evm_chain_ids: HashMap<ChainName, u64>,
}

impl PipelineConfig {
    /// Add an EVM chain.
    pub fn with_evm_chain(mut self, chain: ChainName, chain_id: u64) -> Self {
        self.evm_chain_ids.insert(chain, chain_id);
        self
    }
}

/// `unsigned_<id>` -> PipelineRecord
pub const UNSIGNED: &str = "unsigned_";
/// `signed_<id>` -> SignedTransaction
pub const SIGNED: &str = "signed_";

/// Join a prefix and an id.
pub fn key(prefix: &str, id: &str) -> Vec<u8> {
    let mut k = Vec::with_capacity(prefix.len() + id.len());
    k.extend_from_slice(prefix.as_bytes());
    k.extend_from_slice(id.as_bytes());
    k
}
