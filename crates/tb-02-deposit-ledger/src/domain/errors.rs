//! # Domain Errors
//!
//! Error types for the deposit ledger.

use super::entities::DepositState;
use shared_types::KVStoreError;
use thiserror::Error;

/// Deposit ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No record for the id.
    #[error("Deposit not found: {0}")]
    NotFound(String),

    /// The id is held with different content or a contrary outcome.
    #[error("Conflicting deposit {id}: {reason}")]
    Conflict {
        /// Deposit id
        id: String,
        /// What conflicts
        reason: String,
    },

    /// Transition not allowed from the current state.
    #[error("Invalid deposit transition for {id}: {from} -> {to}")]
    InvalidTransition {
        /// Deposit id
        id: String,
        /// Current state
        from: DepositState,
        /// Attempted state
        to: DepositState,
    },

    /// The deposit itself is malformed.
    #[error("Invalid deposit: {0}")]
    InvalidDeposit(String),

    /// Confirm/Burn on a deposit that is not a token deposit.
    #[error("Deposit {0} is not a token deposit")]
    NotTokenized(String),

    /// More than one state holds a record for the same id.
    #[error("Ledger invariant violated: {0}")]
    InvariantViolation(String),

    /// Underlying store failed.
    #[error(transparent)]
    Store(#[from] KVStoreError),
}
