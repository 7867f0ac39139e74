//! # TB-02 Deposit Ledger
//!
//! Persistent lifecycle of external-chain deposits.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Lifecycle
//!
//! ```text
//! Unverified ──true──→ Verified ──confirm──→ Confirmed ──burn──→ Burned
//!     │
//!     └──false──→ Rejected (deleted)
//! ```
//!
//! Each stored state owns a disjoint key range under the chain's namespace:
//!
//! | State | Prefix |
//! |-------|--------|
//! | Unverified | `pending_deposit_` |
//! | Verified | `verified_deposit_` |
//! | Confirmed | `confirmed_deposit_` |
//! | Burned | `burned_deposit_` |
//!
//! The ledger also keeps the tracked-address set, pending token
//! deployments and command data.

#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    Deposit, DepositId, DepositState, Erc20Deposit, LedgerError, OutPointInfo, TokenDeployment,
};
pub use ports::DepositLedgerApi;
pub use service::{ConfirmedDeposits, DepositLedger};
