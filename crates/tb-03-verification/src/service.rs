//! # Verification Engine
//!
//! Fetches the actual event for a claim and compares the two. The result
//! is one validator's vote input; tallying happens elsewhere.

use crate::domain::{check_event, ClaimedEvent, ObservedEvent, VerificationError};
use crate::ports::{ChainDataClient, VerificationApi};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Verification engine over one chain's data client.
pub struct VerificationEngine<C: ?Sized> {
    client: Arc<C>,
}

impl<C: ?Sized> Clone for VerificationEngine<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: ChainDataClient + ?Sized> VerificationEngine<C> {
    /// Create an engine over `client`.
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }
}

#[async_trait]
impl<C: ChainDataClient + ?Sized> VerificationApi for VerificationEngine<C> {
    async fn verify(&self, expected: &ClaimedEvent) -> Result<ObservedEvent, VerificationError> {
        debug!("[tb-03] Verifying {}", expected.reference);

        let actual = self
            .client
            .get_event_info(&expected.reference)
            .await
            .map_err(|e| VerificationError::ChainUnavailable(e.to_string()))?;

        if let Err(e) = check_event(expected, &actual) {
            warn!("[tb-03] {} could not be verified: {}", expected.reference, e);
            return Err(e);
        }

        debug!("[tb-03] {} verified", expected.reference);
        Ok(actual)
    }
}
