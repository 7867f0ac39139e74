//! # Ports
//!
//! Inbound API of the ledger. Persistence goes through the shared
//! `KeyValueStore` port.

pub mod inbound;

pub use inbound::DepositLedgerApi;
