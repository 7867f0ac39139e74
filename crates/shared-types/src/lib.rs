//! # Shared Types Crate
//!
//! Types every bridge subsystem agrees on, and the storage port they all
//! persist through.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: chain names, cross-chain addresses, poll
//!   metadata and threshold key material are defined once, here.
//! - **Namespaced Storage**: every record lives under the lower-cased name of
//!   the external chain it describes (see [`store::ChainStore`]).
//! - **Ordered Keys**: prefix scans return entries in key order so batch jobs
//!   see the same sequence on every validator.

pub mod entities;
pub mod errors;
pub mod store;

pub use entities::*;
pub use errors::*;
pub use store::{BatchOperation, ChainBatch, ChainStore, InMemoryKVStore, KeyValueStore};
