//! # Domain Services
//!
//! The comparison itself. Checks run in a fixed order and the first
//! failure wins.

use super::entities::{ClaimedEvent, ObservedEvent};
use super::errors::VerificationError;

/// Compare a claim with what the chain reports.
///
/// 1. recipient equality
/// 2. amount equality
/// 3. `actual.confirmations >= expected.confirmations`
pub fn check_event(expected: &ClaimedEvent, actual: &ObservedEvent) -> Result<(), VerificationError> {
    if actual.recipient != expected.recipient {
        return Err(VerificationError::RecipientMismatch {
            expected: expected.recipient.clone(),
            actual: actual.recipient.clone(),
        });
    }

    if actual.amount != expected.amount {
        return Err(VerificationError::AmountMismatch {
            expected: expected.amount,
            actual: actual.amount,
        });
    }

    if actual.confirmations < expected.confirmations {
        return Err(VerificationError::InsufficientConfirmations {
            required: expected.confirmations,
            actual: actual.confirmations,
        });
    }

    Ok(())
}
