//! # Adapters
//!
//! Implementations of the runtime's own ports plus production storage.

pub mod storage;
pub mod voter;

pub use voter::InMemoryVoter;
