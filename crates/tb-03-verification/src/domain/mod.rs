//! # Domain Module
//!
//! Claimed and observed events and the comparison between them.

pub mod entities;
pub mod errors;
pub mod services;

pub use entities::*;
pub use errors::*;
pub use services::*;
