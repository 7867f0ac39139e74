//! # Domain Entities
//!
//! Token and burner metadata persisted by the deriver, plus the result of a
//! deposit-address derivation.

use super::errors::DerivationError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, U256};

/// Highest decimals value whose unit (10^decimals) still fits in a uint256.
pub const MAX_TOKEN_DECIMALS: u8 = 77;

/// Parameters of a token deployment request, as submitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDeployParams {
    /// Human-readable token name.
    pub token_name: String,
    /// Ticker symbol, also the salt source of the token address.
    pub symbol: String,
    /// Decimal places.
    pub decimals: u8,
    /// Maximum supply as a decimal string.
    pub capacity: String,
}

impl TokenDeployParams {
    /// Validate the parameters and turn them into unconfirmed token info.
    pub fn into_token_info(self) -> Result<TokenInfo, DerivationError> {
        if self.token_name.trim().is_empty() {
            return Err(DerivationError::EncodingError("empty token name".into()));
        }
        if self.symbol.trim().is_empty() {
            return Err(DerivationError::EncodingError("empty token symbol".into()));
        }
        if self.decimals > MAX_TOKEN_DECIMALS {
            return Err(DerivationError::EncodingError(format!(
                "decimals {} exceed {}",
                self.decimals, MAX_TOKEN_DECIMALS
            )));
        }
        let capacity = U256::from_dec_str(self.capacity.trim()).map_err(|e| {
            DerivationError::EncodingError(format!("capacity {:?}: {:?}", self.capacity, e))
        })?;

        Ok(TokenInfo {
            token_name: self.token_name,
            symbol: self.symbol,
            decimals: self.decimals,
            capacity,
            confirmed: false,
        })
    }
}

/// Registered token parameters. Stored under `symbol_<SYMBOL>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub token_name: String,
    pub symbol: String,
    pub decimals: u8,
    pub capacity: U256,
    /// Set once the deployment on the external chain has been attested.
    pub confirmed: bool,
}

impl TokenInfo {
    /// Same parameters, ignoring confirmation.
    pub fn same_params(&self, other: &TokenInfo) -> bool {
        self.token_name == other.token_name
            && self.symbol == other.symbol
            && self.decimals == other.decimals
            && self.capacity == other.capacity
    }
}

/// Metadata of a derived burner address. Stored under `burnerAddr_<addr>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnerInfo {
    /// Token contract the burner forwards to.
    pub token_address: Address,
    /// Token symbol.
    pub symbol: String,
    /// CREATE2 salt (keccak256 of the recipient).
    pub salt: Hash,
}

/// Where a deposit address is derived from.
#[derive(Clone, Copy, Debug)]
pub enum DepositSource<'a> {
    /// A threshold public key (Bitcoin).
    PublicKey(&'a [u8]),
    /// A registered token symbol (EVM burner).
    Token(&'a str),
}

/// A derived deposit address with whatever metadata its chain needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DerivedAddress {
    /// P2WSH address and its witness script.
    Bitcoin { address: String, script: Vec<u8> },
    /// Burner address and its metadata.
    Evm { address: Address, info: BurnerInfo },
}

impl DerivedAddress {
    /// Chain-native string encoding of the address.
    pub fn address_string(&self) -> String {
        match self {
            DerivedAddress::Bitcoin { address, .. } => address.clone(),
            DerivedAddress::Evm { address, .. } => format_evm_address(address),
        }
    }
}

/// `0x`-prefixed lower-case hex.
pub fn format_evm_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Parse a `0x`-prefixed (or bare) 20-byte hex address.
pub fn parse_evm_address(s: &str) -> Result<Address, DerivationError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped)
        .map_err(|e| DerivationError::EncodingError(format!("address {:?}: {}", s, e)))?;
    Address::try_from(bytes.as_slice()).map_err(|_| {
        DerivationError::EncodingError(format!("address {:?}: expected 20 bytes", s))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TokenDeployParams {
        TokenDeployParams {
            token_name: "Satoshi".into(),
            symbol: "satoshi".into(),
            decimals: 8,
            capacity: "10000000000".into(),
        }
    }

    #[test]
    fn test_valid_params_become_unconfirmed_info() {
        let info = params().into_token_info().unwrap();
        assert_eq!(info.capacity, U256::from(10_000_000_000u64));
        assert!(!info.confirmed);
    }

    #[test]
    fn test_malformed_capacity_rejected() {
        let mut p = params();
        p.capacity = "12abc".into();
        assert!(matches!(
            p.into_token_info(),
            Err(DerivationError::EncodingError(_))
        ));
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let mut p = params();
        p.symbol = "  ".into();
        assert!(matches!(
            p.into_token_info(),
            Err(DerivationError::EncodingError(_))
        ));
    }

    #[test]
    fn test_decimals_out_of_range_rejected() {
        let mut p = params();
        p.decimals = 78;
        assert!(p.into_token_info().is_err());
    }

    #[test]
    fn test_evm_address_parse_format() {
        let addr = [0xabu8; 20];
        let s = format_evm_address(&addr);
        assert_eq!(parse_evm_address(&s).unwrap(), addr);
        assert!(parse_evm_address("0x1234").is_err());
    }
}
