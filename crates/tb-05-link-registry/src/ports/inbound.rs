//! # Inbound Port
//!
//! Link and transfer-queue operations offered to the message handler.

use crate::domain::{CrossChainTransfer, LinkError};
use shared_types::{ChainName, CrossChainAddress, U256};

/// Link registry API.
pub trait LinkRegistryApi {
    /// Bind `deposit` to `recipient`. Binding the same pair again is a
    /// no-op; a different recipient fails with `AlreadyLinked`.
    fn link(&self, deposit: &CrossChainAddress, recipient: &CrossChainAddress) -> Result<(), LinkError>;

    /// Recipient bound to `deposit`.
    fn resolve(&self, deposit: &CrossChainAddress) -> Result<CrossChainAddress, LinkError>;

    /// Deposit addresses bound to `recipient`, in key order.
    fn deposit_addresses(&self, recipient: &CrossChainAddress) -> Result<Vec<CrossChainAddress>, LinkError>;

    /// Queue `amount` of `asset` received at `deposit` for its recipient.
    fn enqueue(
        &self,
        deposit: &CrossChainAddress,
        amount: U256,
        asset: &str,
    ) -> Result<CrossChainTransfer, LinkError>;

    /// Pending transfers to `chain`, oldest first.
    fn pending_transfers(&self, chain: &ChainName) -> Result<Vec<CrossChainTransfer>, LinkError>;

    /// Mark a pending transfer as executed. Archiving an unknown or an
    /// archived transfer fails.
    fn archive(&self, chain: &ChainName, id: u64) -> Result<(), LinkError>;
}
