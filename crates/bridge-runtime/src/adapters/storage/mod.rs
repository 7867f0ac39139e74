//! # Storage Adapters
//!
//! Production key-value store behind the `rocksdb` feature. Tests and dev
//! nodes use `shared_types::InMemoryKVStore`.

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};
