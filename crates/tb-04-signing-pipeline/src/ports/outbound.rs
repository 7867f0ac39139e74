//! # Outbound Ports
//!
//! The threshold signer and the source of spendable deposits.

use crate::domain::{SignerError, SigningError};
use shared_types::{ChainName, Hash, KeyId, Snapshot, ThresholdKey, Validator};
use tb_02_deposit_ledger::{Deposit, DepositId};

/// Threshold signing subsystem - outbound port.
///
/// `start_sign` only hands the hash off; the signature arrives later
/// through a separate message.
pub trait Signer: Send + Sync {
    /// Start a signing round for `hash` with `key_id` among `signers`.
    fn start_sign(
        &self,
        key_id: &KeyId,
        sig_id: &str,
        hash: &Hash,
        signers: &[Validator],
    ) -> Result<(), SignerError>;

    /// Current master key of a chain.
    fn current_key(&self, chain: &ChainName) -> Option<ThresholdKey>;

    /// Key by id.
    fn key(&self, key_id: &KeyId) -> Option<ThresholdKey>;

    /// Validator snapshot the key was generated for.
    fn snapshot_for_key(&self, key_id: &KeyId) -> Option<Snapshot>;
}

/// Spendable deposits and their locking scripts - outbound port.
pub trait InputSource: Send + Sync {
    /// The deposit behind `id` if it is Verified or Confirmed.
    fn spendable_deposit(&self, chain: &ChainName, id: &DepositId) -> Result<Option<Deposit>, SigningError>;

    /// Witness script of a Bitcoin deposit address.
    fn witness_script(&self, address: &str) -> Result<Option<Vec<u8>>, SigningError>;
}
