//! # Signing Pipeline Service
//!
//! Drives one outgoing transaction per id through
//! `Unsigned → HashComputed → SigningRequested → Signed`.
//!
//! ## Invariants
//!
//! - Every input spends a Verified or Confirmed deposit when the
//!   transaction is stored.
//! - Content is frozen once a signature has been requested.
//! - At most one signing request per transaction.
//! - A signed transaction exists only for a signature over the stored hash.
//! - A failed operation leaves the stored record untouched.

use crate::domain::bitcoin_spend;
use crate::domain::evm::{self, eip155_v, MAX_CHAIN_ID};
use crate::domain::signature;
use crate::domain::{
    key, PipelineConfig, PipelineRecord, PipelineState, SignedTransaction, SigningError, SpendInfo,
    UnsignedTx, SIGNED, UNSIGNED,
};
use crate::ports::{InputSource, Signer, SigningPipelineApi};
use shared_types::{ChainName, ChainStore, Hash, KeyId, KeyValueStore, ThresholdSignature, Validator};
use std::sync::Arc;
use tb_02_deposit_ledger::Deposit;
use tracing::{debug, info, warn};

/// The signing pipeline.
pub struct SigningPipeline<S: ?Sized, I, G> {
    store: Arc<S>,
    inputs: Arc<I>,
    signer: Arc<G>,
    config: PipelineConfig,
}

impl<S: ?Sized, I, G> Clone for SigningPipeline<S, I, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            inputs: Arc::clone(&self.inputs),
            signer: Arc::clone(&self.signer),
            config: self.config.clone(),
        }
    }
}

impl<S, I, G> SigningPipeline<S, I, G>
where
    S: KeyValueStore + ?Sized,
    I: InputSource,
    G: Signer,
{
    pub fn new(store: Arc<S>, inputs: Arc<I>, signer: Arc<G>, config: PipelineConfig) -> Self {
        Self {
            store,
            inputs,
            signer,
            config,
        }
    }

    /// The threshold signer this pipeline hands hashes to.
    pub fn signer(&self) -> &Arc<G> {
        &self.signer
    }

    fn view(&self, chain: &ChainName) -> ChainStore<'_, S> {
        ChainStore::new(self.store.as_ref(), chain)
    }

    fn load(&self, view: &ChainStore<'_, S>, id: &str) -> Result<PipelineRecord, SigningError> {
        view.get_record(&key(UNSIGNED, id))?
            .ok_or_else(|| SigningError::NoUnsignedTx(id.to_string()))
    }

    fn chain_id(&self, chain: &ChainName) -> Result<u64, SigningError> {
        self.config
            .evm_chain_ids
            .get(chain)
            .copied()
            .ok_or_else(|| SigningError::UnsupportedTransaction(format!("{} is not an EVM chain", chain)))
    }

    /// Reject a transaction the chain cannot carry.
    fn check_shape(&self, chain: &ChainName, tx: &UnsignedTx) -> Result<(), SigningError> {
        match tx {
            UnsignedTx::Bitcoin(tx) => {
                if !chain.is_bitcoin() {
                    return Err(SigningError::UnsupportedTransaction(format!(
                        "bitcoin transaction on {}",
                        chain
                    )));
                }
                bitcoin_spend::require_single_input(tx)
            }
            UnsignedTx::Evm(tx) => {
                let chain_id = self.chain_id(chain)?;
                if chain_id > MAX_CHAIN_ID {
                    return Err(SigningError::UnsupportedTransaction(format!(
                        "chain id {} of {} is out of range",
                        chain_id, chain
                    )));
                }
                if tx.deposits.is_empty() {
                    return Err(SigningError::UnsupportedTransaction(format!(
                        "transaction on {} settles no deposits",
                        chain
                    )));
                }
                Ok(())
            }
        }
    }

    /// Spend data of the single deposit a Bitcoin transaction consumes.
    fn spend_info(&self, chain: &ChainName, id: &str, tx: &UnsignedTx) -> Result<SpendInfo, SigningError> {
        let input = tx
            .input_ids()
            .into_iter()
            .next()
            .ok_or_else(|| SigningError::UnsupportedTransaction("transaction has no inputs".into()))?;

        let deposit = self.inputs.spendable_deposit(chain, &input)?.ok_or_else(|| {
            SigningError::UnverifiedInput {
                tx: id.to_string(),
                input: input.to_string(),
            }
        })?;
        let outpoint = match deposit {
            Deposit::OutPoint(outpoint) => outpoint,
            Deposit::Erc20(_) => {
                return Err(SigningError::UnsupportedTransaction(format!(
                    "input {} is not an outpoint",
                    input
                )))
            }
        };

        let witness_script = self
            .inputs
            .witness_script(&outpoint.recipient)?
            .ok_or_else(|| SigningError::MissingScript(outpoint.recipient.clone()))?;
        Ok(SpendInfo {
            witness_script,
            amount: outpoint.amount,
        })
    }

    /// Signing hash of `tx`, with the Bitcoin spend data it commits to.
    fn signing_hash(
        &self,
        chain: &ChainName,
        id: &str,
        tx: &UnsignedTx,
    ) -> Result<(Hash, Option<SpendInfo>), SigningError> {
        self.check_shape(chain, tx)?;
        match tx {
            UnsignedTx::Evm(evm_tx) => Ok((evm_tx.signing_hash(self.chain_id(chain)?), None)),
            UnsignedTx::Bitcoin(btc_tx) => {
                let spend = self.spend_info(chain, id, tx)?;
                let hash = bitcoin_spend::signing_hash(btc_tx, &spend)?;
                Ok((hash, Some(spend)))
            }
        }
    }
}

impl<S, I, G> SigningPipelineApi for SigningPipeline<S, I, G>
where
    S: KeyValueStore + ?Sized,
    I: InputSource,
    G: Signer,
{
    fn set_unsigned_tx(&self, chain: &ChainName, id: &str, tx: UnsignedTx) -> Result<(), SigningError> {
        let view = self.view(chain);
        if let Some(existing) = view.get_record::<PipelineRecord>(&key(UNSIGNED, id))? {
            if existing.state.is_locked() {
                if existing.tx == tx {
                    debug!("[tb-04] Transaction {} resubmitted unchanged", id);
                    return Ok(());
                }
                return Err(SigningError::ContentLocked(id.to_string()));
            }
        }

        self.check_shape(chain, &tx)?;
        for input in tx.input_ids() {
            if self.inputs.spendable_deposit(chain, &input)?.is_none() {
                warn!("[tb-04] Transaction {} spends unverified input {}", id, input);
                return Err(SigningError::UnverifiedInput {
                    tx: id.to_string(),
                    input: input.to_string(),
                });
            }
        }

        view.put_record(&key(UNSIGNED, id), &PipelineRecord::new(tx))?;
        info!("[tb-04] Stored unsigned transaction {} on {}", id, chain);
        Ok(())
    }

    fn compute_signing_hash(&self, chain: &ChainName, id: &str) -> Result<Hash, SigningError> {
        let view = self.view(chain);
        let mut record = self.load(&view, id)?;
        if let Some(hash) = record.hash {
            return Ok(hash);
        }

        let (hash, spend) = self.signing_hash(chain, id, &record.tx)?;
        record.hash = Some(hash);
        record.spend = spend;
        record.state = PipelineState::HashComputed;
        view.put_record(&key(UNSIGNED, id), &record)?;

        debug!("[tb-04] Signing hash of {}: {}", id, hex::encode(hash));
        Ok(hash)
    }

    fn request_signature(
        &self,
        chain: &ChainName,
        id: &str,
        key_id: &KeyId,
        hash: &Hash,
        signers: &[Validator],
    ) -> Result<(), SigningError> {
        let view = self.view(chain);
        let mut record = self.load(&view, id)?;

        let stored = record
            .hash
            .ok_or_else(|| SigningError::HashNotComputed(id.to_string()))?;
        if stored != *hash {
            return Err(SigningError::HashMismatch(id.to_string()));
        }
        if record.state.is_locked() {
            return Err(SigningError::AlreadyRequested(id.to_string()));
        }

        let sig_id = hex::encode(hash);
        self.signer
            .start_sign(key_id, &sig_id, hash, signers)
            .map_err(|e| {
                warn!("[tb-04] Signing {} with {} failed to start: {}", id, key_id, e);
                SigningError::SignerUnavailable(e.to_string())
            })?;

        record.state = PipelineState::SigningRequested;
        record.key_id = Some(key_id.clone());
        view.put_record(&key(UNSIGNED, id), &record)?;

        info!("[tb-04] Requested signature for {} with key {}", id, key_id);
        Ok(())
    }

    fn assemble_signed(
        &self,
        chain: &ChainName,
        id: &str,
        public_key: &[u8],
        signature: &ThresholdSignature,
    ) -> Result<SignedTransaction, SigningError> {
        let view = self.view(chain);
        let mut record = self.load(&view, id)?;
        if let Some(signed) = view.get_record::<SignedTransaction>(&key(SIGNED, id))? {
            debug!("[tb-04] Transaction {} already assembled", id);
            return Ok(signed);
        }

        if record.state != PipelineState::SigningRequested {
            return Err(SigningError::SignatureNotRequested(id.to_string()));
        }

        let hash = record
            .hash
            .ok_or_else(|| SigningError::HashNotComputed(id.to_string()))?;
        let spend = record.spend.clone();
        let (sig, recovery_id) = signature::prepare(public_key, &hash, signature)?;

        let (raw, tx_hash) = match &record.tx {
            UnsignedTx::Evm(evm_tx) => {
                let chain_id = self.chain_id(chain)?;
                let v = eip155_v(recovery_id.to_byte(), chain_id).ok_or_else(|| {
                    SigningError::UnsupportedTransaction(format!("chain id {} of {} is out of range", chain_id, chain))
                })?;
                let (r, s) = sig.split_bytes();
                let (r, s): ([u8; 32], [u8; 32]) = (r.into(), s.into());
                let raw = evm_tx.encode_signed(v, &r, &s);
                let tx_hash = format!("0x{}", hex::encode(evm::tx_hash(&raw)));
                (raw, tx_hash)
            }
            UnsignedTx::Bitcoin(btc_tx) => {
                let spend = spend.ok_or_else(|| SigningError::HashNotComputed(id.to_string()))?;
                let signed = bitcoin_spend::assemble(btc_tx, &spend, &sig)?;
                (
                    bitcoin_spend::serialize(&signed),
                    signed.compute_txid().to_string(),
                )
            }
        };

        let signed = SignedTransaction {
            id: id.to_string(),
            chain: chain.clone(),
            raw,
            tx_hash,
        };
        record.state = PipelineState::Signed;

        let mut batch = view.batch();
        batch
            .put_record(&key(UNSIGNED, id), &record)?
            .put_record(&key(SIGNED, id), &signed)?;
        view.commit(batch)?;

        info!("[tb-04] Assembled {} on {} as {}", id, chain, signed.tx_hash);
        Ok(signed)
    }

    fn record(&self, chain: &ChainName, id: &str) -> Result<Option<PipelineRecord>, SigningError> {
        Ok(self.view(chain).get_record(&key(UNSIGNED, id))?)
    }

    fn signed_tx(&self, chain: &ChainName, id: &str) -> Result<Option<SignedTransaction>, SigningError> {
        Ok(self.view(chain).get_record(&key(SIGNED, id))?)
    }
}
