//! # Ports
//!
//! Inbound verification API and the outbound chain-data client.

pub mod inbound;
pub mod outbound;

pub use inbound::VerificationApi;
pub use outbound::ChainDataClient;
