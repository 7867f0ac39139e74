//! # Bridge Runtime
//!
//! Validator-side wiring of the threshold bridge.
//!
//! ## Modular Structure
//!
//! - `config` - TOML configuration with `TB_*` environment overrides
//! - `chain` - per-chain dispatch (`ChainAdapter`)
//! - `ports` - the voting module interface
//! - `adapters` - in-memory voter, RocksDB store (feature `rocksdb`)
//! - `worker` - background address import with its own error channel
//! - `handler` - `BridgeHandler`, one message at a time
//!
//! ## Startup Sequence
//!
//! 1. Initialise telemetry
//! 2. Load configuration (file, then environment)
//! 3. Open the store
//! 4. Spawn the rescan worker
//! 5. Build the handler and process messages until shutdown

#![warn(clippy::all)]

pub mod adapters;
pub mod chain;
pub mod config;
pub mod handler;
pub mod ports;
pub mod worker;

pub use adapters::InMemoryVoter;
pub use chain::ChainAdapter;
pub use config::{BridgeConfig, ConfigError, StorageBackend};
pub use handler::{BridgeHandler, BridgeMsg, HandlerError, MsgResult, TrackTarget};
pub use ports::{Voter, VoterError};
pub use worker::{spawn_rescan_worker, RescanHandle, RescanRequest, TrackingFailure};
