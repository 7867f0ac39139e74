//! # Inbound Port
//!
//! API offered to the message handler.

use crate::domain::{BurnerInfo, DepositSource, DerivationError, DerivedAddress, TokenDeployParams, TokenInfo};
use shared_types::{Address, ChainName, CrossChainAddress};

/// Address derivation API.
pub trait AddressDerivationApi {
    /// Derive the deposit address on `chain` that routes to `recipient`.
    ///
    /// Bitcoin takes a public key; EVM chains take a confirmed token symbol.
    /// Deterministic: the same inputs always give the same address.
    fn derive_deposit_address(
        &self,
        chain: &ChainName,
        source: DepositSource<'_>,
        recipient: &CrossChainAddress,
    ) -> Result<DerivedAddress, DerivationError>;

    /// Record the gateway contract address of an EVM chain.
    fn set_gateway_address(&self, chain: &ChainName, address: Address) -> Result<(), DerivationError>;

    /// Gateway contract address, if deployed.
    fn gateway_address(&self, chain: &ChainName) -> Result<Option<Address>, DerivationError>;

    /// Register (unconfirmed) token parameters.
    fn register_token(
        &self,
        chain: &ChainName,
        params: TokenDeployParams,
    ) -> Result<TokenInfo, DerivationError>;

    /// Mark a registered token as deployed.
    fn confirm_token(&self, chain: &ChainName, symbol: &str) -> Result<(), DerivationError>;

    /// Registered token parameters.
    fn token_info(&self, chain: &ChainName, symbol: &str) -> Result<Option<TokenInfo>, DerivationError>;

    /// CREATE2 address of a registered token.
    fn token_address(&self, chain: &ChainName, symbol: &str) -> Result<Address, DerivationError>;

    /// Burner metadata of a previously derived address.
    fn burner_info(&self, chain: &ChainName, address: &Address) -> Result<Option<BurnerInfo>, DerivationError>;

    /// Witness script of a previously derived Bitcoin deposit address.
    fn deposit_script(&self, address: &str) -> Result<Option<Vec<u8>>, DerivationError>;
}
