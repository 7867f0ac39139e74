//! # Key-Value Store Port
//!
//! Abstract ordered key-value store plus the chain-namespaced view every
//! subsystem writes through.
//!
//! Production: `RocksDbStore` (bridge-runtime/adapters/storage/rocksdb_adapter.rs)
//! Testing: [`InMemoryKVStore`] (below)
//!
//! ## Key Layout
//!
//! ```text
//! <lower-cased chain name> "/" <record prefix> <record id>
//! ```
//!
//! Each record prefix defines a disjoint keyspace that can be scanned
//! independently.

use crate::entities::ChainName;
use crate::errors::KVStoreError;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// Abstract interface for key-value database operations.
///
/// Methods take `&self`; backends serialize writes internally. The bridge
/// itself processes one message at a time, so no caller-side locking is
/// needed.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch are applied, or NONE are.
    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Encode a record for storage.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, KVStoreError> {
    bincode::serialize(value).map_err(KVStoreError::codec)
}

/// Decode a stored record.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, KVStoreError> {
    bincode::deserialize(bytes).map_err(KVStoreError::codec)
}

// =============================================================================
// IN-MEMORY ADAPTER
// =============================================================================

/// In-memory key-value store for unit tests and development nodes.
///
/// Keys are kept in a `BTreeMap` so prefix scans come back ordered, like
/// the RocksDB backend.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.write().remove(key);
        Ok(())
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        // Single write lock for the whole batch
        let mut data = self.data.write();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.read().contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let data = self.data.read();
        let results = data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(results)
    }
}

// =============================================================================
// CHAIN-NAMESPACED VIEW
// =============================================================================

/// View of a store restricted to one chain's namespace.
///
/// All keys passed in and returned are relative to the namespace.
pub struct ChainStore<'a, S: ?Sized> {
    inner: &'a S,
    namespace: Vec<u8>,
}

impl<'a, S: KeyValueStore + ?Sized> ChainStore<'a, S> {
    /// Namespace `inner` by `chain`.
    pub fn new(inner: &'a S, chain: &ChainName) -> Self {
        let mut namespace = chain.namespace().into_bytes();
        namespace.push(b'/');
        Self { inner, namespace }
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.namespace.len() + key.len());
        full.extend_from_slice(&self.namespace);
        full.extend_from_slice(key);
        full
    }

    /// Raw get.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.inner.get(&self.full_key(key))
    }

    /// Raw put.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.inner.put(&self.full_key(key), value)
    }

    /// Raw delete.
    pub fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.inner.delete(&self.full_key(key))
    }

    /// Key presence.
    pub fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.inner.exists(&self.full_key(key))
    }

    /// Decode the record under `key`, if any.
    pub fn get_record<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, KVStoreError> {
        self.get(key)?.map(|bz| decode(&bz)).transpose()
    }

    /// Encode and store a record under `key`.
    pub fn put_record<T: Serialize>(&self, key: &[u8], value: &T) -> Result<(), KVStoreError> {
        self.put(key, &encode(value)?)
    }

    /// Entries under `prefix` in key order, keys relative to the namespace.
    pub fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let ns_len = self.namespace.len();
        Ok(self
            .inner
            .prefix_scan(&self.full_key(prefix))?
            .into_iter()
            .map(|(k, v)| (k[ns_len..].to_vec(), v))
            .collect())
    }

    /// Keys under `prefix` in key order, relative to the namespace.
    pub fn scan_keys(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, KVStoreError> {
        Ok(self.prefix_scan(prefix)?.into_iter().map(|(k, _)| k).collect())
    }

    /// Decoded records under `prefix` in key order.
    pub fn scan_records<T: DeserializeOwned>(&self, prefix: &[u8]) -> Result<Vec<T>, KVStoreError> {
        self.prefix_scan(prefix)?
            .iter()
            .map(|(_, v)| decode(v))
            .collect()
    }

    /// Start an atomic batch in this namespace.
    pub fn batch(&self) -> ChainBatch {
        ChainBatch {
            namespace: self.namespace.clone(),
            operations: Vec::new(),
        }
    }

    /// Apply a batch started by [`ChainStore::batch`].
    pub fn commit(&self, batch: ChainBatch) -> Result<(), KVStoreError> {
        if batch.operations.is_empty() {
            return Ok(());
        }
        self.inner.atomic_batch_write(batch.operations)
    }
}

/// Pending atomic write within one chain namespace.
#[derive(Debug)]
pub struct ChainBatch {
    namespace: Vec<u8>,
    operations: Vec<BatchOperation>,
}

impl ChainBatch {
    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = self.namespace.clone();
        full.extend_from_slice(key);
        full
    }

    /// Queue a raw put.
    pub fn put(&mut self, key: &[u8], value: Vec<u8>) -> &mut Self {
        let key = self.full_key(key);
        self.operations.push(BatchOperation::put(key, value));
        self
    }

    /// Queue an encoded record.
    pub fn put_record<T: Serialize>(&mut self, key: &[u8], value: &T) -> Result<&mut Self, KVStoreError> {
        let bz = encode(value)?;
        Ok(self.put(key, bz))
    }

    /// Queue a delete.
    pub fn delete(&mut self, key: &[u8]) -> &mut Self {
        let key = self.full_key(key);
        self.operations.push(BatchOperation::delete(key));
        self
    }

    /// Move the operations of a batch from another namespace into this
    /// one, so writes spanning two chains commit together. Each operation
    /// keeps the namespace it was queued under.
    pub fn append(&mut self, mut other: ChainBatch) -> &mut Self {
        self.operations.append(&mut other.operations);
        self
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        amount: u64,
        memo: String,
    }

    #[test]
    fn test_prefix_scan_is_ordered() {
        let store = InMemoryKVStore::new();
        store.put(b"p_c", b"3").unwrap();
        store.put(b"p_a", b"1").unwrap();
        store.put(b"q_a", b"x").unwrap();
        store.put(b"p_b", b"2").unwrap();

        let keys: Vec<_> = store
            .prefix_scan(b"p_")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![b"p_a".to_vec(), b"p_b".to_vec(), b"p_c".to_vec()]);
    }

    #[test]
    fn test_namespaces_are_disjoint() {
        let store = InMemoryKVStore::new();
        let eth = ChainStore::new(&store, &ChainName::new("Ethereum"));
        let btc = ChainStore::new(&store, &ChainName::bitcoin());

        eth.put(b"gateway", b"eth-gw").unwrap();
        assert!(btc.get(b"gateway").unwrap().is_none());
        assert_eq!(eth.get(b"gateway").unwrap(), Some(b"eth-gw".to_vec()));
        assert!(store.exists(b"ethereum/gateway").unwrap());
    }

    #[test]
    fn test_namespace_uses_lowercase_chain_name() {
        let store = InMemoryKVStore::new();
        ChainStore::new(&store, &ChainName::new("ETHEREUM"))
            .put(b"k", b"v")
            .unwrap();
        let view = ChainStore::new(&store, &ChainName::new("Ethereum"));
        assert_eq!(view.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_record_round_trip_and_relative_scan_keys() {
        let store = InMemoryKVStore::new();
        let view = ChainStore::new(&store, &ChainName::bitcoin());
        let rec = Record {
            amount: 5000,
            memo: "deposit".into(),
        };
        view.put_record(b"rec_1", &rec).unwrap();

        assert_eq!(view.get_record::<Record>(b"rec_1").unwrap(), Some(rec));
        assert_eq!(view.scan_keys(b"rec_").unwrap(), vec![b"rec_1".to_vec()]);
    }

    #[test]
    fn test_batch_applies_all_operations() {
        let store = InMemoryKVStore::new();
        let view = ChainStore::new(&store, &ChainName::bitcoin());
        view.put(b"pending_x", b"1").unwrap();

        let mut batch = view.batch();
        batch.delete(b"pending_x").put(b"verified_x", b"1".to_vec());
        view.commit(batch).unwrap();

        assert!(!view.exists(b"pending_x").unwrap());
        assert!(view.exists(b"verified_x").unwrap());
    }

    #[test]
    fn test_appended_batch_keeps_its_namespace() {
        let store = InMemoryKVStore::new();
        let btc = ChainStore::new(&store, &ChainName::bitcoin());
        let axelar = ChainStore::new(&store, &ChainName::axelar());

        let mut batch = btc.batch();
        batch.put(b"k", b"btc".to_vec());
        let mut other = axelar.batch();
        other.put(b"k", b"axl".to_vec());
        batch.append(other);
        assert_eq!(batch.len(), 2);

        btc.commit(batch).unwrap();
        assert_eq!(btc.get(b"k").unwrap(), Some(b"btc".to_vec()));
        assert_eq!(axelar.get(b"k").unwrap(), Some(b"axl".to_vec()));
    }

    #[test]
    fn test_decode_garbage_is_codec_error() {
        let store = InMemoryKVStore::new();
        let view = ChainStore::new(&store, &ChainName::bitcoin());
        view.put(b"rec_bad", &[0xFF]).unwrap();
        let err = view.get_record::<Record>(b"rec_bad").unwrap_err();
        assert!(matches!(err, KVStoreError::CodecError { .. }));
    }
}
