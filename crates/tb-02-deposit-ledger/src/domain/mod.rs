//! # Domain Module
//!
//! Deposit records, their lifecycle and key layout.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use value_objects::*;
