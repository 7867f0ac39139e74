//! # Domain Module
//!
//! Links, transfers and their key layout.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use value_objects::*;
