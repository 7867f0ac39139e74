//! # TB-05 Link Registry
//!
//! Binds derived deposit addresses to internal recipients and queues the
//! value that arrives at them.
//!
//! **Subsystem ID:** 5
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Flow
//!
//! ```text
//! link(deposit, recipient) ──→ deposit confirmed ──→ enqueue(deposit, amount, asset)
//!                                                         │
//!                            archive(id) ←── executed ←── pending_transfers(chain)
//! ```
//!
//! Links are append-only. A deposit address resolves to exactly one
//! recipient for its whole life.

#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{CrossChainTransfer, LinkError, TransferState};
pub use ports::LinkRegistryApi;
pub use service::LinkRegistry;
