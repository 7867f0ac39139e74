//! # Deposit Ledger Service
//!
//! Persistent lifecycle store for external-chain deposits, namespaced per
//! chain.
//!
//! ## Invariants
//!
//! - At most one state's key range holds a record for a given id. A lookup
//!   that finds more than one reports `InvariantViolation`.
//! - State changes are a single atomic batch (delete old key, put new key).
//! - Transitions only move forward.

use crate::domain::{
    deposit_key, key, state_prefix, Deposit, DepositId, DepositState, LedgerError, TokenDeployment,
    COMMAND, CONFIRMED_DEPOSIT, PENDING_DEPOSIT, PENDING_TOKEN, STATE_PREFIXES, TRACKED,
};
use crate::ports::DepositLedgerApi;
use shared_types::{ChainName, ChainStore, Hash, KeyValueStore, PollMeta};
use std::sync::Arc;
use std::vec;
use tracing::{debug, error, info};

const TRACKED_MARKER: &[u8] = &[1];

/// The deposit ledger.
pub struct DepositLedger<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for DepositLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore + ?Sized> DepositLedger<S> {
    /// Create a ledger over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn view(&self, chain: &ChainName) -> ChainStore<'_, S> {
        ChainStore::new(self.store.as_ref(), chain)
    }

    /// Find the single state holding `id`.
    fn locate(
        &self,
        view: &ChainStore<'_, S>,
        id: &DepositId,
    ) -> Result<Option<(Deposit, DepositState)>, LedgerError> {
        let mut found: Option<(Deposit, DepositState)> = None;
        for (state, prefix) in STATE_PREFIXES {
            if let Some(deposit) = view.get_record::<Deposit>(&deposit_key(prefix, id))? {
                if let Some((_, other)) = &found {
                    error!(
                        "[tb-02] Deposit {} stored as both {} and {}",
                        id, other, state
                    );
                    return Err(LedgerError::InvariantViolation(format!(
                        "deposit {} stored as both {} and {}",
                        id, other, state
                    )));
                }
                found = Some((deposit, state));
            }
        }
        Ok(found)
    }

    /// Atomically move `deposit` from one state's key range to another's.
    fn move_deposit(
        &self,
        view: &ChainStore<'_, S>,
        deposit: &Deposit,
        from: DepositState,
        to: DepositState,
    ) -> Result<(), LedgerError> {
        let id = deposit.id();
        let invalid = || LedgerError::InvalidTransition {
            id: id.to_string(),
            from,
            to,
        };
        let from_prefix = state_prefix(from).ok_or_else(invalid)?;

        let mut batch = view.batch();
        batch.delete(&deposit_key(from_prefix, &id));
        if let Some(to_prefix) = state_prefix(to) {
            batch.put_record(&deposit_key(to_prefix, &id), deposit)?;
        }
        view.commit(batch)?;

        info!("[tb-02] Deposit {} {} -> {}", id, from, to);
        Ok(())
    }

    /// Advance a token deposit from `from` to `to`; a deposit already in
    /// `to` is left as is.
    fn advance_token(
        &self,
        chain: &ChainName,
        id: &DepositId,
        from: DepositState,
        to: DepositState,
    ) -> Result<(), LedgerError> {
        let view = self.view(chain);
        let (deposit, state) = self
            .locate(&view, id)?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;

        if !deposit.is_tokenized() {
            return Err(LedgerError::NotTokenized(id.to_string()));
        }
        if state == to {
            debug!("[tb-02] Deposit {} already {}", id, to);
            return Ok(());
        }
        if state != from {
            return Err(LedgerError::InvalidTransition {
                id: id.to_string(),
                from: state,
                to,
            });
        }
        self.move_deposit(&view, &deposit, from, to)
    }

    /// Lazy, key-ordered sequence of the chain's Confirmed deposits.
    ///
    /// Keys are snapshotted when the sequence is created; records are read
    /// and decoded one at a time. Deposits that leave the Confirmed state
    /// before they are reached are skipped.
    pub fn query_all_confirmed(&self, chain: &ChainName) -> Result<ConfirmedDeposits<'_, S>, LedgerError> {
        self.query_confirmed_after(chain, None)
    }

    /// Resume a Confirmed sequence after `after` (exclusive).
    pub fn query_confirmed_after(
        &self,
        chain: &ChainName,
        after: Option<&DepositId>,
    ) -> Result<ConfirmedDeposits<'_, S>, LedgerError> {
        let view = self.view(chain);
        let start = after.map(|id| deposit_key(CONFIRMED_DEPOSIT, id));
        let keys: Vec<Vec<u8>> = view
            .scan_keys(CONFIRMED_DEPOSIT.as_bytes())?
            .into_iter()
            .filter(|k| start.as_ref().map_or(true, |s| k > s))
            .collect();

        Ok(ConfirmedDeposits {
            view,
            keys: keys.into_iter(),
            last: None,
        })
    }
}

impl<S: KeyValueStore + ?Sized> DepositLedgerApi for DepositLedger<S> {
    fn record_unverified(&self, chain: &ChainName, deposit: &Deposit) -> Result<DepositId, LedgerError> {
        let view = self.view(chain);
        let deposit = &deposit.canonical()?;
        let id = deposit.id();

        match self.locate(&view, &id)? {
            None => {
                view.put_record(&deposit_key(PENDING_DEPOSIT, &id), deposit)?;
                info!("[tb-02] Recorded unverified deposit {} on {}", id, chain);
                Ok(id)
            }
            Some((existing, DepositState::Unverified)) if existing == *deposit => {
                debug!("[tb-02] Deposit {} already pending", id);
                Ok(id)
            }
            Some((_, DepositState::Unverified)) => Err(LedgerError::Conflict {
                id: id.to_string(),
                reason: "a different claim is already pending".into(),
            }),
            Some((_, state)) => Err(LedgerError::Conflict {
                id: id.to_string(),
                reason: format!("already {}", state),
            }),
        }
    }

    fn transition(&self, chain: &ChainName, id: &DepositId, outcome: bool) -> Result<DepositState, LedgerError> {
        let view = self.view(chain);

        match (self.locate(&view, id)?, outcome) {
            (None, true) => Err(LedgerError::NotFound(id.to_string())),
            // Rejected records are deleted, so an absent id is already rejected
            (None, false) => Ok(DepositState::Rejected),
            (Some((deposit, DepositState::Unverified)), true) => {
                self.move_deposit(&view, &deposit, DepositState::Unverified, DepositState::Verified)?;
                Ok(DepositState::Verified)
            }
            (Some((deposit, DepositState::Unverified)), false) => {
                self.move_deposit(&view, &deposit, DepositState::Unverified, DepositState::Rejected)?;
                Ok(DepositState::Rejected)
            }
            (Some((_, state)), true) => {
                debug!("[tb-02] Deposit {} already {}", id, state);
                Ok(state)
            }
            (Some((_, state)), false) => Err(LedgerError::Conflict {
                id: id.to_string(),
                reason: format!("cannot reject a deposit that is already {}", state),
            }),
        }
    }

    fn confirm(&self, chain: &ChainName, id: &DepositId) -> Result<(), LedgerError> {
        self.advance_token(chain, id, DepositState::Verified, DepositState::Confirmed)
    }

    fn burn(&self, chain: &ChainName, id: &DepositId) -> Result<(), LedgerError> {
        self.advance_token(chain, id, DepositState::Confirmed, DepositState::Burned)
    }

    fn query(&self, chain: &ChainName, id: &DepositId) -> Result<Option<(Deposit, DepositState)>, LedgerError> {
        self.locate(&self.view(chain), id)
    }

    fn set_tracked_address(&self, chain: &ChainName, address: &str) -> Result<(), LedgerError> {
        let view = self.view(chain);
        let k = key(TRACKED, address);
        if !view.exists(&k)? {
            view.put(&k, TRACKED_MARKER)?;
            info!("[tb-02] Tracking {} on {}", address, chain);
        }
        Ok(())
    }

    fn is_tracked(&self, chain: &ChainName, address: &str) -> Result<bool, LedgerError> {
        Ok(self.view(chain).exists(&key(TRACKED, address))?)
    }

    fn tracked_addresses(&self, chain: &ChainName) -> Result<Vec<String>, LedgerError> {
        Ok(self
            .view(chain)
            .scan_keys(TRACKED.as_bytes())?
            .into_iter()
            .map(|k| String::from_utf8_lossy(&k[TRACKED.len()..]).into_owned())
            .collect())
    }

    fn set_pending_token_deployment(
        &self,
        chain: &ChainName,
        poll: &PollMeta,
        deployment: &TokenDeployment,
    ) -> Result<(), LedgerError> {
        self.view(chain)
            .put_record(&key(PENDING_TOKEN, &poll.to_string()), deployment)?;
        debug!("[tb-02] Pending token deployment {} for poll {}", deployment.symbol, poll);
        Ok(())
    }

    fn pending_token_deployment(
        &self,
        chain: &ChainName,
        poll: &PollMeta,
    ) -> Result<Option<TokenDeployment>, LedgerError> {
        Ok(self
            .view(chain)
            .get_record(&key(PENDING_TOKEN, &poll.to_string()))?)
    }

    fn delete_pending_token_deployment(&self, chain: &ChainName, poll: &PollMeta) -> Result<(), LedgerError> {
        Ok(self.view(chain).delete(&key(PENDING_TOKEN, &poll.to_string()))?)
    }

    fn set_command_data(&self, chain: &ChainName, command_id: &Hash, data: &[u8]) -> Result<(), LedgerError> {
        Ok(self
            .view(chain)
            .put(&key(COMMAND, &hex::encode(command_id)), data)?)
    }

    fn command_data(&self, chain: &ChainName, command_id: &Hash) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.view(chain).get(&key(COMMAND, &hex::encode(command_id)))?)
    }
}

/// Lazy sequence of Confirmed deposits. See
/// [`DepositLedger::query_all_confirmed`].
pub struct ConfirmedDeposits<'a, S: ?Sized> {
    view: ChainStore<'a, S>,
    keys: vec::IntoIter<Vec<u8>>,
    last: Option<DepositId>,
}

impl<S: ?Sized> ConfirmedDeposits<'_, S> {
    /// Id of the last deposit yielded; pass it to
    /// [`DepositLedger::query_confirmed_after`] to resume.
    pub fn last_id(&self) -> Option<&DepositId> {
        self.last.as_ref()
    }
}

impl<S: KeyValueStore + ?Sized> Iterator for ConfirmedDeposits<'_, S> {
    type Item = Result<Deposit, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let k = self.keys.next()?;
            match self.view.get_record::<Deposit>(&k) {
                Ok(Some(deposit)) => {
                    self.last = Some(deposit.id());
                    return Some(Ok(deposit));
                }
                Ok(None) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
