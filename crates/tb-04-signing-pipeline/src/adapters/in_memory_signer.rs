//! In-Memory Signer
//!
//! Holds public keys and snapshots only. Signatures are produced outside
//! and delivered through `assemble_signed`, exactly as with the real
//! threshold protocol.

use crate::domain::SignerError;
use crate::ports::Signer;
use parking_lot::RwLock;
use shared_types::{ChainName, Hash, KeyId, Snapshot, ThresholdKey, Validator};
use std::collections::HashMap;
use tracing::info;

/// A recorded `start_sign` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignRequest {
    pub key_id: KeyId,
    pub sig_id: String,
    pub hash: Hash,
    pub signers: Vec<Validator>,
}

#[derive(Default)]
struct SignerState {
    keys: HashMap<KeyId, ThresholdKey>,
    current: HashMap<ChainName, KeyId>,
    snapshots: HashMap<KeyId, Snapshot>,
    requests: Vec<SignRequest>,
    reject: bool,
}

/// In-memory threshold signer.
#[derive(Default)]
pub struct InMemorySigner {
    state: RwLock<SignerState>,
}

impl InMemorySigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key and the snapshot it was generated for.
    pub fn add_key(&self, key: ThresholdKey, snapshot: Snapshot) {
        let mut state = self.state.write();
        state.snapshots.insert(key.id.clone(), snapshot);
        state.keys.insert(key.id.clone(), key);
    }

    /// Make `key_id` the master key of `chain`.
    pub fn set_current_key(&self, chain: ChainName, key_id: KeyId) {
        self.state.write().current.insert(chain, key_id);
    }

    /// Refuse every subsequent `start_sign`.
    pub fn set_reject(&self, reject: bool) {
        self.state.write().reject = reject;
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<SignRequest> {
        self.state.read().requests.clone()
    }
}

impl Signer for InMemorySigner {
    fn start_sign(
        &self,
        key_id: &KeyId,
        sig_id: &str,
        hash: &Hash,
        signers: &[Validator],
    ) -> Result<(), SignerError> {
        let mut state = self.state.write();
        if state.reject {
            return Err(SignerError::Rejected("signer offline".into()));
        }
        if !state.keys.contains_key(key_id) {
            return Err(SignerError::UnknownKey(key_id.to_string()));
        }

        state.requests.push(SignRequest {
            key_id: key_id.clone(),
            sig_id: sig_id.to_string(),
            hash: *hash,
            signers: signers.to_vec(),
        });
        info!("[tb-04] Sign round {} started with key {}", sig_id, key_id);
        Ok(())
    }

    fn current_key(&self, chain: &ChainName) -> Option<ThresholdKey> {
        let state = self.state.read();
        state
            .current
            .get(chain)
            .and_then(|id| state.keys.get(id))
            .cloned()
    }

    fn key(&self, key_id: &KeyId) -> Option<ThresholdKey> {
        self.state.read().keys.get(key_id).cloned()
    }

    fn snapshot_for_key(&self, key_id: &KeyId) -> Option<Snapshot> {
        self.state.read().snapshots.get(key_id).cloned()
    }
}
