//! Ledger Input Source
//!
//! Resolves pipeline inputs against the deposit ledger and Bitcoin witness
//! scripts against the address deriver's cache.

use crate::domain::SigningError;
use crate::ports::InputSource;
use shared_types::{ChainName, KeyValueStore};
use tb_01_address_derivation::{AddressDerivationApi, AddressDeriver, DerivationError};
use tb_02_deposit_ledger::{Deposit, DepositId, DepositLedger, DepositLedgerApi};

/// Input source over the ledger and deriver sharing one store.
pub struct LedgerInputSource<S: ?Sized> {
    ledger: DepositLedger<S>,
    deriver: AddressDeriver<S>,
}

impl<S: KeyValueStore + ?Sized> LedgerInputSource<S> {
    pub fn new(ledger: DepositLedger<S>, deriver: AddressDeriver<S>) -> Self {
        Self { ledger, deriver }
    }
}

impl<S: KeyValueStore + ?Sized> InputSource for LedgerInputSource<S> {
    fn spendable_deposit(&self, chain: &ChainName, id: &DepositId) -> Result<Option<Deposit>, SigningError> {
        Ok(self
            .ledger
            .query(chain, id)?
            .filter(|(_, state)| state.is_spendable())
            .map(|(deposit, _)| deposit))
    }

    fn witness_script(&self, address: &str) -> Result<Option<Vec<u8>>, SigningError> {
        self.deriver.deposit_script(address).map_err(|e| match e {
            DerivationError::Store(e) => SigningError::Store(e),
            other => SigningError::MissingScript(other.to_string()),
        })
    }
}
