//! # Inbound Port
//!
//! Deposit lifecycle operations offered to the message handler and the
//! signing pipeline.

use crate::domain::{Deposit, DepositId, DepositState, LedgerError, TokenDeployment};
use shared_types::{ChainName, Hash, PollMeta};

/// Deposit ledger API.
pub trait DepositLedgerApi {
    /// Record a claimed deposit as Unverified.
    ///
    /// Re-recording the same claim is a no-op. Fails with `Conflict` if the
    /// id holds a different claim or has already been settled.
    fn record_unverified(&self, chain: &ChainName, deposit: &Deposit) -> Result<DepositId, LedgerError>;

    /// Apply a decided poll outcome: `true` verifies, `false` rejects
    /// (deletes). Repeating an outcome is a no-op.
    fn transition(&self, chain: &ChainName, id: &DepositId, outcome: bool) -> Result<DepositState, LedgerError>;

    /// Verified -> Confirmed, token deposits only.
    fn confirm(&self, chain: &ChainName, id: &DepositId) -> Result<(), LedgerError>;

    /// Confirmed -> Burned, token deposits only.
    fn burn(&self, chain: &ChainName, id: &DepositId) -> Result<(), LedgerError>;

    /// Deposit and its state, if recorded.
    fn query(&self, chain: &ChainName, id: &DepositId) -> Result<Option<(Deposit, DepositState)>, LedgerError>;

    /// True when the deposit is Verified or Confirmed.
    fn is_spendable(&self, chain: &ChainName, id: &DepositId) -> Result<bool, LedgerError> {
        Ok(self
            .query(chain, id)?
            .map(|(_, state)| state.is_spendable())
            .unwrap_or(false))
    }

    /// Add an address to the watched set.
    fn set_tracked_address(&self, chain: &ChainName, address: &str) -> Result<(), LedgerError>;

    /// Whether an address is watched.
    fn is_tracked(&self, chain: &ChainName, address: &str) -> Result<bool, LedgerError>;

    /// All watched addresses in key order.
    fn tracked_addresses(&self, chain: &ChainName) -> Result<Vec<String>, LedgerError>;

    /// Store the token deployment a poll decides on.
    fn set_pending_token_deployment(
        &self,
        chain: &ChainName,
        poll: &PollMeta,
        deployment: &TokenDeployment,
    ) -> Result<(), LedgerError>;

    /// Token deployment of a poll.
    fn pending_token_deployment(
        &self,
        chain: &ChainName,
        poll: &PollMeta,
    ) -> Result<Option<TokenDeployment>, LedgerError>;

    /// Drop a decided token deployment.
    fn delete_pending_token_deployment(&self, chain: &ChainName, poll: &PollMeta) -> Result<(), LedgerError>;

    /// Store opaque command bytes.
    fn set_command_data(&self, chain: &ChainName, command_id: &Hash, data: &[u8]) -> Result<(), LedgerError>;

    /// Command bytes by id.
    fn command_data(&self, chain: &ChainName, command_id: &Hash) -> Result<Option<Vec<u8>>, LedgerError>;
}
