//! # Domain Errors

use shared_types::KVStoreError;
use thiserror::Error;

/// Link registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The deposit address is bound to a different recipient.
    #[error("{address} is already linked to {existing}")]
    AlreadyLinked {
        /// Deposit address
        address: String,
        /// Recipient it is bound to
        existing: String,
    },

    /// No link or transfer under the given key.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transfer amount is zero.
    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),

    /// The transfer has already been archived.
    #[error("Transfer already archived: {0}")]
    AlreadyArchived(String),

    /// Underlying store failed.
    #[error(transparent)]
    Store(#[from] KVStoreError),
}
