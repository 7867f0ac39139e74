//! # Link Registry Service
//!
//! Append-only bindings between derived deposit addresses and internal
//! recipients, and the queue of transfers owed to those recipients.
//!
//! A link is written in both directions in one batch: the forward key in
//! the deposit chain's namespace, the reverse key in the recipient chain's.

use crate::domain::{
    link_key, linked_key, linked_prefix, transfer_key, CrossChainTransfer, LinkError, TransferState,
    NEXT_TRANSFER_ID, TRANSFER,
};
use crate::ports::LinkRegistryApi;
use shared_types::{ChainName, ChainStore, CrossChainAddress, KeyValueStore, U256};
use std::sync::Arc;
use tracing::{debug, info};

/// The link registry.
pub struct LinkRegistry<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for LinkRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore + ?Sized> LinkRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn view(&self, chain: &ChainName) -> ChainStore<'_, S> {
        ChainStore::new(self.store.as_ref(), chain)
    }

    /// Recipient bound to `deposit`, if any.
    pub fn try_resolve(&self, deposit: &CrossChainAddress) -> Result<Option<CrossChainAddress>, LinkError> {
        Ok(self.view(&deposit.chain).get_record(&link_key(deposit))?)
    }

    /// Transfer by destination chain and id.
    pub fn transfer(&self, chain: &ChainName, id: u64) -> Result<Option<CrossChainTransfer>, LinkError> {
        Ok(self.view(chain).get_record(&transfer_key(id))?)
    }
}

impl<S: KeyValueStore + ?Sized> LinkRegistryApi for LinkRegistry<S> {
    fn link(&self, deposit: &CrossChainAddress, recipient: &CrossChainAddress) -> Result<(), LinkError> {
        if let Some(existing) = self.try_resolve(deposit)? {
            if existing == *recipient {
                debug!("[tb-05] {} already linked to {}", deposit, recipient);
                return Ok(());
            }
            return Err(LinkError::AlreadyLinked {
                address: deposit.to_string(),
                existing: existing.to_string(),
            });
        }

        let forward = self.view(&deposit.chain);
        let mut batch = forward.batch();
        batch.put_record(&link_key(deposit), recipient)?;
        let mut reverse = self.view(&recipient.chain).batch();
        reverse.put_record(&linked_key(recipient, deposit), deposit)?;
        batch.append(reverse);
        forward.commit(batch)?;

        info!("[tb-05] Linked {} to {}", deposit, recipient);
        Ok(())
    }

    fn resolve(&self, deposit: &CrossChainAddress) -> Result<CrossChainAddress, LinkError> {
        self.try_resolve(deposit)?
            .ok_or_else(|| LinkError::NotFound(format!("link for {}", deposit)))
    }

    fn deposit_addresses(&self, recipient: &CrossChainAddress) -> Result<Vec<CrossChainAddress>, LinkError> {
        Ok(self
            .view(&recipient.chain)
            .scan_records(&linked_prefix(recipient))?)
    }

    fn enqueue(
        &self,
        deposit: &CrossChainAddress,
        amount: U256,
        asset: &str,
    ) -> Result<CrossChainTransfer, LinkError> {
        if amount.is_zero() {
            return Err(LinkError::InvalidTransfer(format!("zero amount at {}", deposit)));
        }
        let recipient = self.resolve(deposit)?;

        let view = self.view(&recipient.chain);
        let id: u64 = view.get_record(NEXT_TRANSFER_ID)?.unwrap_or(0);
        let transfer = CrossChainTransfer {
            id,
            deposit_address: deposit.clone(),
            recipient,
            amount,
            asset: asset.to_string(),
            state: TransferState::Pending,
        };

        let mut batch = view.batch();
        batch
            .put_record(&transfer_key(id), &transfer)?
            .put_record(NEXT_TRANSFER_ID, &(id + 1))?;
        view.commit(batch)?;

        info!(
            "[tb-05] Queued transfer {} of {} {} to {}",
            id, transfer.amount, transfer.asset, transfer.recipient
        );
        Ok(transfer)
    }

    fn pending_transfers(&self, chain: &ChainName) -> Result<Vec<CrossChainTransfer>, LinkError> {
        let transfers: Vec<CrossChainTransfer> = self.view(chain).scan_records(TRANSFER.as_bytes())?;
        Ok(transfers.into_iter().filter(|t| t.is_pending()).collect())
    }

    fn archive(&self, chain: &ChainName, id: u64) -> Result<(), LinkError> {
        let view = self.view(chain);
        let mut transfer = self
            .transfer(chain, id)?
            .ok_or_else(|| LinkError::NotFound(format!("transfer {} to {}", id, chain)))?;
        if !transfer.is_pending() {
            return Err(LinkError::AlreadyArchived(format!("transfer {} to {}", id, chain)));
        }

        transfer.state = TransferState::Archived;
        view.put_record(&transfer_key(id), &transfer)?;
        debug!("[tb-05] Archived transfer {} to {}", id, chain);
        Ok(())
    }
}
