//! # Value Objects
//!
//! Derivation parameters and storage key layout.

use bitcoin::Network;
use shared_types::ChainName;
use std::collections::HashMap;

/// Contract bytecodes of one EVM chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvmBytecodes {
    /// Token contract creation code.
    pub token: Vec<u8>,
    /// Burner contract creation code.
    pub burner: Vec<u8>,
}

/// Derivation parameters, fixed at construction.
#[derive(Clone, Debug)]
pub struct DerivationConfig {
    /// Network the Bitcoin deposit addresses are encoded for.
    pub bitcoin_network: Network,
    /// Bytecodes per EVM chain.
    pub evm_chains: HashMap<ChainName, EvmBytecodes>,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            bitcoin_network: Network::Regtest,
            evm_chains: HashMap::new(),
        }
    }
}

impl DerivationConfig {
    /// Add an EVM chain.
    pub fn with_evm_chain(mut self, chain: ChainName, bytecodes: EvmBytecodes) -> Self {
        self.evm_chains.insert(chain, bytecodes);
        self
    }
}

/// Key prefixes owned by the deriver.
pub mod keys {
    /// Gateway contract address.
    pub const GATEWAY: &[u8] = b"gateway";
    /// `symbol_<SYMBOL>` -> TokenInfo
    pub const SYMBOL: &str = "symbol_";
    /// `tokenAddr_<SYMBOL>` -> 20 bytes
    pub const TOKEN_ADDR: &str = "tokenAddr_";
    /// `burnerAddr_<hex>` -> BurnerInfo
    pub const BURNER_ADDR: &str = "burnerAddr_";
    /// `btc_script_<address>` -> witness script
    pub const BTC_SCRIPT: &str = "btc_script_";

    /// Join a prefix and an id.
    pub fn key(prefix: &str, id: &str) -> Vec<u8> {
        let mut k = Vec::with_capacity(prefix.len() + id.len());
        k.extend_from_slice(prefix.as_bytes());
        k.extend_from_slice(id.as_bytes());
        k
    }
}
