//! # Domain Module
//!
//! CREATE2 derivations, Bitcoin deposit scripts and the token
//! registry records.

pub mod deposit_script;
pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use services::*;
pub use value_objects::*;
