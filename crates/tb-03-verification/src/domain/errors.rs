//! # Domain Errors
//!
//! Why a claimed event failed verification. Every variant is a negative
//! vote; none is retried.

use shared_types::U256;
use thiserror::Error;

/// Verification failures, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// Event data could not be fetched from the external chain.
    #[error("Chain data unavailable: {0}")]
    ChainUnavailable(String),

    /// Funds went somewhere else.
    #[error("Recipient mismatch: expected {expected}, actual {actual}")]
    RecipientMismatch {
        /// Claimed recipient
        expected: String,
        /// Recipient on chain
        actual: String,
    },

    /// Different amount on chain.
    #[error("Amount mismatch: expected {expected}, actual {actual}")]
    AmountMismatch {
        /// Claimed amount
        expected: U256,
        /// Amount on chain
        actual: U256,
    },

    /// Not buried deep enough yet.
    #[error("Insufficient confirmations: {actual}/{required}")]
    InsufficientConfirmations {
        /// Confirmations required by the claim
        required: u64,
        /// Confirmations on chain
        actual: u64,
    },
}

/// Errors reported by a chain-data client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainClientError {
    /// Node unreachable or returned garbage.
    #[error("Chain client unavailable: {0}")]
    Unavailable(String),

    /// Transaction or output unknown to the node.
    #[error("Not found on chain: {0}")]
    NotFound(String),

    /// Node refused a submitted transaction.
    #[error("Transaction rejected: {0}")]
    Rejected(String),
}
