//! # Domain Module
//!
//! Transaction models, signing hashes, signature normalisation and the
//! pipeline record.

pub mod bitcoin_spend;
pub mod entities;
pub mod errors;
pub mod evm;
pub mod signature;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use value_objects::*;
