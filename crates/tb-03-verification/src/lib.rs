//! # TB-03 Verification
//!
//! Compare a claimed external-chain event with what the chain reports.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Checks (in order)
//!
//! | Check | Failure |
//! |-------|---------|
//! | fetch succeeds | `ChainUnavailable` |
//! | recipient equal | `RecipientMismatch` |
//! | amount equal | `AmountMismatch` |
//! | actual >= claimed confirmations | `InsufficientConfirmations` |
//!
//! Any failure is a negative vote.

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{MockChainDataClient, RecordedCall};
pub use domain::{
    check_event, ChainClientError, ClaimedEvent, EventRef, ObservedEvent, OutputRef,
    VerificationError,
};
pub use ports::{ChainDataClient, VerificationApi};
pub use service::VerificationEngine;
