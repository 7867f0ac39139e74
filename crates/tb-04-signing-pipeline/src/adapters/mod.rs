//! # Adapters
//!
//! - `in_memory_signer`: threshold signer stand-in that records requests
//! - `ledger_inputs`: input source backed by the deposit ledger and the
//!   address deriver's script cache

pub mod in_memory_signer;
pub mod ledger_inputs;

pub use in_memory_signer::{InMemorySigner, SignRequest};
pub use ledger_inputs::LedgerInputSource;
