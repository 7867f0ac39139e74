//! # Ports
//!
//! The deriver has no outbound dependencies beyond the shared key-value
//! store port.

pub mod inbound;

pub use inbound::AddressDerivationApi;
