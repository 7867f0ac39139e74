//! # Ports
//!
//! Inbound pipeline API; outbound signer and input source.

pub mod inbound;
pub mod outbound;

pub use inbound::SigningPipelineApi;
pub use outbound::{InputSource, Signer};
