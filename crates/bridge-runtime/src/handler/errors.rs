//! Handler errors. Subsystem errors pass through unchanged.

use crate::config::ConfigError;
use crate::ports::VoterError;
use tb_01_address_derivation::DerivationError;
use tb_02_deposit_ledger::LedgerError;
use tb_03_verification::ChainClientError;
use tb_04_signing_pipeline::SigningError;
use tb_05_link_registry::LinkError;
use thiserror::Error;

/// Why a message failed. A failed message leaves no partial state behind
/// beyond what the failing subsystem call itself guarantees.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Voter(#[from] VoterError),

    #[error(transparent)]
    ChainClient(#[from] ChainClientError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to encode result: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    #[error("No chain client for {0}")]
    NoChainClient(String),

    #[error("No master key for {0}")]
    NoMasterKey(String),

    #[error("No snapshot for key {0}")]
    NoSnapshot(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}
