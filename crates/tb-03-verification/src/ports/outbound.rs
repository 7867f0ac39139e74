//! # Outbound Ports
//!
//! External chain access needed by verification, tracking and broadcast.

use crate::domain::{ChainClientError, EventRef, ObservedEvent};
use async_trait::async_trait;

/// Chain-data client - outbound port.
///
/// One client per external chain. The wire protocol behind it is not the
/// bridge's concern.
#[async_trait]
pub trait ChainDataClient: Send + Sync {
    /// Fetch the event a reference points at.
    async fn get_event_info(&self, reference: &EventRef) -> Result<ObservedEvent, ChainClientError>;

    /// Add an address to the node's watch list, optionally rescanning
    /// history. May take a long time.
    async fn import_address_rescan(
        &self,
        address: &str,
        label: &str,
        rescan: bool,
    ) -> Result<(), ChainClientError>;

    /// Submit a serialized signed transaction. Returns its id.
    async fn send_raw_transaction(
        &self,
        raw_tx: &[u8],
        allow_high_fees: bool,
    ) -> Result<String, ChainClientError>;

    /// Network the node runs on (e.g. `mainnet`, `regtest`).
    fn network(&self) -> String;
}
