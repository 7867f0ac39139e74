//! # Domain Errors
//!
//! Error types for address derivation.

use shared_types::KVStoreError;
use thiserror::Error;

/// Address derivation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    /// Token parameters or addresses that cannot be encoded.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Gateway, token info or confirmed token missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Token info already registered with different parameters.
    #[error("Token {symbol} already registered on {chain} with different parameters")]
    TokenExists {
        /// Chain name
        chain: String,
        /// Token symbol
        symbol: String,
    },

    /// Chain has no derivation parameters configured.
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    /// Public key bytes are not a valid secp256k1 point.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Underlying store failed.
    #[error(transparent)]
    Store(#[from] KVStoreError),
}
