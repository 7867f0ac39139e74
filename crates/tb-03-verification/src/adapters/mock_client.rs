//! Mock Chain-Data Client
//!
//! In-memory `ChainDataClient` for tests and dev nodes. Events are seeded
//! by the test; every call is recorded so tests can assert on it.

use crate::domain::{ChainClientError, EventRef, ObservedEvent};
use crate::ports::ChainDataClient;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A call made against the mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCall {
    GetEventInfo(EventRef),
    ImportAddressRescan { address: String, rescan: bool },
    SendRawTransaction(Vec<u8>),
}

/// Mock chain-data client.
pub struct MockChainDataClient {
    network: String,
    events: RwLock<HashMap<EventRef, ObservedEvent>>,
    failing_imports: RwLock<HashSet<String>>,
    unavailable: RwLock<bool>,
    calls: RwLock<Vec<RecordedCall>>,
}

impl MockChainDataClient {
    /// Create an empty mock on `network`.
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            events: RwLock::new(HashMap::new()),
            failing_imports: RwLock::new(HashSet::new()),
            unavailable: RwLock::new(false),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Seed an event.
    pub fn with_event(self, reference: EventRef, event: ObservedEvent) -> Self {
        self.insert_event(reference, event);
        self
    }

    /// Seed or replace an event.
    pub fn insert_event(&self, reference: EventRef, event: ObservedEvent) {
        self.events.write().insert(reference, event);
    }

    /// Make every call fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write() = unavailable;
    }

    /// Make importing `address` fail.
    pub fn fail_import(&self, address: impl Into<String>) {
        self.failing_imports.write().insert(address.into());
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().clone()
    }

    fn check_available(&self) -> Result<(), ChainClientError> {
        if *self.unavailable.read() {
            return Err(ChainClientError::Unavailable("mock node offline".to_string()));
        }
        Ok(())
    }
}

impl Default for MockChainDataClient {
    fn default() -> Self {
        Self::new("regtest")
    }
}

#[async_trait]
impl ChainDataClient for MockChainDataClient {
    async fn get_event_info(&self, reference: &EventRef) -> Result<ObservedEvent, ChainClientError> {
        self.calls
            .write()
            .push(RecordedCall::GetEventInfo(reference.clone()));
        self.check_available()?;

        self.events
            .read()
            .get(reference)
            .cloned()
            .ok_or_else(|| ChainClientError::NotFound(reference.to_string()))
    }

    async fn import_address_rescan(
        &self,
        address: &str,
        _label: &str,
        rescan: bool,
    ) -> Result<(), ChainClientError> {
        self.calls.write().push(RecordedCall::ImportAddressRescan {
            address: address.to_string(),
            rescan,
        });
        self.check_available()?;

        if self.failing_imports.read().contains(address) {
            return Err(ChainClientError::Rejected(format!("cannot import {}", address)));
        }
        debug!("[tb-03] Mock imported {} (rescan={})", address, rescan);
        Ok(())
    }

    async fn send_raw_transaction(
        &self,
        raw_tx: &[u8],
        _allow_high_fees: bool,
    ) -> Result<String, ChainClientError> {
        self.calls
            .write()
            .push(RecordedCall::SendRawTransaction(raw_tx.to_vec()));
        self.check_available()?;

        Ok(hex::encode(&raw_tx[..raw_tx.len().min(32)]))
    }

    fn network(&self) -> String {
        self.network.clone()
    }
}
