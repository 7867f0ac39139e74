//! # Inbound Port
//!
//! Verification API offered to the message handler.

use crate::domain::{ClaimedEvent, ObservedEvent, VerificationError};
use async_trait::async_trait;

/// Verification API.
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// Fetch the actual event and compare it with the claim.
    async fn verify(&self, expected: &ClaimedEvent) -> Result<ObservedEvent, VerificationError>;

    /// This validator's vote on the claim: `true` only if it verifies.
    async fn vote(&self, expected: &ClaimedEvent) -> bool {
        self.verify(expected).await.is_ok()
    }
}
