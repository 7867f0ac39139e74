//! # Domain Errors
//!
//! Error types for the signing pipeline. A failed operation leaves the
//! stored record as it was.

use shared_types::KVStoreError;
use tb_02_deposit_ledger::LedgerError;
use thiserror::Error;

/// Signing pipeline errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// No unsigned transaction stored under the id.
    #[error("No unsigned transaction for {0}")]
    NoUnsignedTx(String),

    /// An input does not spend a Verified or Confirmed deposit.
    #[error("Transaction {tx} spends unverified input {input}")]
    UnverifiedInput {
        /// Pipeline transaction id
        tx: String,
        /// Deposit id of the input
        input: String,
    },

    /// Signature does not verify against the key and signing hash.
    #[error("Signature mismatch: {0}")]
    SignatureMismatch(String),

    /// Transaction content changed after a signature was requested.
    #[error("Transaction {0} is locked for signing")]
    ContentLocked(String),

    /// A signature request is already outstanding.
    #[error("Signature for {0} already requested")]
    AlreadyRequested(String),

    /// Requested hash differs from the computed signing hash.
    #[error("Signing hash mismatch for {0}")]
    HashMismatch(String),

    /// No signature has been requested for the transaction.
    #[error("No signature requested for {0}")]
    SignatureNotRequested(String),

    /// Signing hash not computed yet.
    #[error("Signing hash for {0} not computed")]
    HashNotComputed(String),

    /// The transaction shape is not supported on this chain.
    #[error("Unsupported transaction: {0}")]
    UnsupportedTransaction(String),

    /// No witness script for the deposit address an input spends.
    #[error("No deposit script for {0}")]
    MissingScript(String),

    /// Public key bytes are not a valid secp256k1 point.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The threshold signer refused to start.
    #[error("Signer failed to start: {0}")]
    SignerUnavailable(String),

    /// Deposit lookup failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Underlying store failed.
    #[error(transparent)]
    Store(#[from] KVStoreError),
}

/// Errors reported by the threshold signer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// Unknown key.
    #[error("Unknown key {0}")]
    UnknownKey(String),

    /// Signing round could not start.
    #[error("Sign start rejected: {0}")]
    Rejected(String),
}
