//! # TB-04 Signing Pipeline
//!
//! Turns verified deposits into threshold-signed outgoing transactions.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Pipeline
//!
//! ```text
//! set_unsigned_tx ──→ compute_signing_hash ──→ request_signature ──→ assemble_signed
//!    Unsigned            HashComputed            SigningRequested         Signed
//! ```
//!
//! - EVM: EIP-155 legacy hash, signed RLP with `v = recid + 2·chainId + 35`
//! - Bitcoin: BIP-143 sighash of one P2WSH deposit input, witness
//!   `[DER ‖ SIGHASH_ALL, witness script]`
//!
//! Signatures from the threshold signer are bare `(r, s)` pairs; they are
//! brought to low-S and checked against the key and hash before assembly.
//!
//! ## Module Structure
//!
//! ```text
//! tb-04-signing-pipeline/
//! ├── domain/          # EVM and Bitcoin models, signature normalisation
//! ├── ports/           # SigningPipelineApi, Signer, InputSource
//! ├── adapters/        # InMemorySigner, LedgerInputSource
//! └── service.rs       # SigningPipeline
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemorySigner, LedgerInputSource, SignRequest};
pub use domain::{
    EvmTransaction, PipelineConfig, PipelineRecord, PipelineState, SignedTransaction, SignerError,
    SigningError, SpendInfo, UnsignedTx,
};
pub use domain::evm::MAX_CHAIN_ID;
pub use ports::{InputSource, Signer, SigningPipelineApi};
pub use service::SigningPipeline;
