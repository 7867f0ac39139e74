//! # TB-01 Address Derivation
//!
//! Deterministic deposit addresses on external chains.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Map threshold keys and token parameters to external-chain addresses that
//! bind funds to an internal cross-chain recipient:
//! - Bitcoin: P2WSH of a recipient-committing witness script
//! - EVM: CREATE2 token and burner contracts deployed by the gateway
//!
//! ## Module Structure
//!
//! ```text
//! tb-01-address-derivation/
//! ├── domain/          # ABI packing, CREATE2, deposit scripts, token records
//! ├── ports/           # AddressDerivationApi
//! └── service.rs       # AddressDeriver (store-backed registry and caches)
//! ```

#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    compute_create2_address, derive_burner_address, derive_token_address, format_evm_address,
    keccak256, parse_evm_address, BurnerInfo, DepositSource, DerivationConfig, DerivationError,
    DerivedAddress, EvmBytecodes, TokenDeployParams, TokenInfo,
};
pub use ports::AddressDerivationApi;
pub use service::AddressDeriver;
