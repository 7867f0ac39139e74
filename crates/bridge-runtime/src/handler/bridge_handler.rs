//! # Bridge Message Handler
//!
//! Wires the five subsystems together and processes one [`BridgeMsg`] at a
//! time.
//!
//! ## Deposit flow
//!
//! ```text
//! VerifyDeposit ──→ DepositLedger (Unverified) ──→ poll opened
//!                        │
//!                        ↓
//!                 VerificationEngine ──→ own vote
//!                                            │
//! Vote ×N ───────────────────────────────────┤
//!                                            ↓ decided
//!                       DepositLedger (Verified / Rejected)
//!                                            │
//!                                            ↓ linked?
//!                              LinkRegistry transfer queue
//! ```

use super::errors::HandlerError;
use super::messages::{BridgeMsg, MsgResult, TrackTarget, DEPOSIT_POLL, TOKEN_DEPLOY_POLL};
use crate::chain::ChainAdapter;
use crate::config::BridgeConfig;
use crate::ports::Voter;
use crate::worker::{RescanHandle, RescanRequest};
use bitcoin::address::NetworkUnchecked;
use bridge_telemetry::metrics::{
    DEPOSITS_REJECTED, DEPOSITS_VERIFIED, HANDLER_ERRORS, LINKS_CREATED, SIGNATURES_REQUESTED,
    TRANSACTIONS_ASSEMBLED, VOTES_CAST,
};
use shared_types::{
    ChainName, CrossChainAddress, Hash, KeyValueStore, PollMeta, ThresholdKey, ThresholdSignature, U256,
};
use std::collections::HashMap;
use std::sync::Arc;
use tb_01_address_derivation::{
    format_evm_address, AddressDerivationApi, AddressDeriver, DepositSource, TokenDeployParams,
};
use tb_02_deposit_ledger::{Deposit, DepositId, DepositLedger, DepositLedgerApi, LedgerError, TokenDeployment};
use tb_03_verification::{ChainDataClient, ClaimedEvent, EventRef, VerificationApi, VerificationEngine};
use tb_04_signing_pipeline::{
    LedgerInputSource, PipelineState, Signer, SigningError, SigningPipeline, SigningPipelineApi, UnsignedTx,
};
use tb_05_link_registry::{LinkRegistry, LinkRegistryApi};
use tracing::{debug, info, warn};

type Pipeline<S, G> = SigningPipeline<S, LedgerInputSource<S>, G>;

/// The validator's message handler.
pub struct BridgeHandler<S: ?Sized, G> {
    config: BridgeConfig,
    deriver: AddressDeriver<S>,
    ledger: DepositLedger<S>,
    pipeline: Pipeline<S, G>,
    registry: LinkRegistry<S>,
    signer: Arc<G>,
    voter: Arc<dyn Voter>,
    clients: HashMap<String, Arc<dyn ChainDataClient>>,
    rescan: Option<RescanHandle>,
}

impl<S, G> BridgeHandler<S, G>
where
    S: KeyValueStore + ?Sized,
    G: Signer,
{
    /// Build every subsystem over `store` and record configured gateway
    /// addresses.
    pub fn new(
        config: BridgeConfig,
        store: Arc<S>,
        signer: Arc<G>,
        voter: Arc<dyn Voter>,
    ) -> Result<Self, HandlerError> {
        let deriver = AddressDeriver::new(Arc::clone(&store), config.derivation_config()?);
        let ledger = DepositLedger::new(Arc::clone(&store));
        let inputs = Arc::new(LedgerInputSource::new(ledger.clone(), deriver.clone()));
        let pipeline = SigningPipeline::new(
            Arc::clone(&store),
            inputs,
            Arc::clone(&signer),
            config.pipeline_config(),
        );
        let registry = LinkRegistry::new(store);

        for evm in &config.evm {
            if let Some(gateway) = evm.gateway()? {
                deriver.set_gateway_address(&ChainName::new(evm.name.clone()), gateway)?;
            }
        }

        Ok(Self {
            config,
            deriver,
            ledger,
            pipeline,
            registry,
            signer,
            voter,
            clients: HashMap::new(),
            rescan: None,
        })
    }

    /// Use `client` to read and broadcast on `chain`.
    pub fn with_chain_client(mut self, chain: &ChainName, client: Arc<dyn ChainDataClient>) -> Self {
        self.clients.insert(chain.namespace(), client);
        self
    }

    /// Hand address rescans to a worker.
    pub fn with_rescan_worker(mut self, handle: RescanHandle) -> Self {
        self.rescan = Some(handle);
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn ledger(&self) -> &DepositLedger<S> {
        &self.ledger
    }

    pub fn deriver(&self) -> &AddressDeriver<S> {
        &self.deriver
    }

    pub fn registry(&self) -> &LinkRegistry<S> {
        &self.registry
    }

    pub fn pipeline(&self) -> &Pipeline<S, G> {
        &self.pipeline
    }

    /// Process one message.
    pub async fn handle(&self, msg: BridgeMsg) -> Result<MsgResult, HandlerError> {
        let name = msg.name();
        debug!("[runtime] Handling {}", name);

        let result = match msg {
            BridgeMsg::Link {
                chain,
                symbol,
                recipient,
            } => self.link(&chain, symbol.as_deref(), &recipient),
            BridgeMsg::Track { target, rescan } => self.track(target, rescan),
            BridgeMsg::VerifyDeposit { chain, deposit } => self.verify_deposit(&chain, deposit).await,
            BridgeMsg::VerifyTokenDeploy { chain, tx_id, symbol } => {
                self.verify_token_deploy(&chain, &tx_id, symbol).await
            }
            BridgeMsg::Vote { poll, voter, value } => self.vote(&poll, &voter, value),
            BridgeMsg::SignDeployToken { chain, params } => self.sign_deploy_token(&chain, params),
            BridgeMsg::SignTx { chain, id, tx } => self.sign_tx(&chain, &id, tx),
            BridgeMsg::AssembleTx {
                chain,
                id,
                signature,
                broadcast,
            } => self.assemble_tx(&chain, &id, &signature, broadcast).await,
            BridgeMsg::PendingTransfers { chain } => self.pending_transfers(&chain),
            BridgeMsg::ArchiveTransfer { chain, id } => self.archive_transfer(&chain, id),
        };

        if let Err(e) = &result {
            HANDLER_ERRORS.with_label_values(&[name]).inc();
            warn!("[runtime] {} failed: {}", name, e);
        }
        result
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    fn resolve_chain(&self, chain: &ChainName) -> Result<(ChainName, ChainAdapter), HandlerError> {
        self.config
            .chain_adapter(chain)
            .ok_or_else(|| HandlerError::UnknownChain(chain.to_string()))
    }

    fn resolve_evm_chain(&self, chain: &ChainName) -> Result<(ChainName, ChainAdapter), HandlerError> {
        let (chain, adapter) = self.resolve_chain(chain)?;
        if adapter.is_bitcoin() {
            return Err(HandlerError::InvalidMessage(format!(
                "{} is not an EVM chain",
                chain
            )));
        }
        Ok((chain, adapter))
    }

    fn client(&self, chain: &ChainName) -> Result<Arc<dyn ChainDataClient>, HandlerError> {
        self.clients
            .get(&chain.namespace())
            .cloned()
            .ok_or_else(|| HandlerError::NoChainClient(chain.to_string()))
    }

    fn current_key(&self, chain: &ChainName) -> Result<ThresholdKey, HandlerError> {
        self.signer
            .current_key(chain)
            .ok_or_else(|| HandlerError::NoMasterKey(chain.to_string()))
    }

    // =========================================================================
    // LINKING AND TRACKING
    // =========================================================================

    fn link(
        &self,
        chain: &ChainName,
        symbol: Option<&str>,
        recipient: &CrossChainAddress,
    ) -> Result<MsgResult, HandlerError> {
        let (chain, adapter) = self.resolve_chain(chain)?;

        let derived = if adapter.is_bitcoin() {
            let key = self.current_key(&chain)?;
            self.deriver
                .derive_deposit_address(&chain, DepositSource::PublicKey(&key.public_key), recipient)?
        } else {
            let symbol = symbol.ok_or_else(|| {
                HandlerError::InvalidMessage(format!("a token symbol is required to link on {}", chain))
            })?;
            self.deriver
                .derive_deposit_address(&chain, DepositSource::Token(symbol), recipient)?
        };

        let address = derived.address_string();
        let deposit = CrossChainAddress::new(chain.clone(), address.clone());
        self.registry.link(&deposit, recipient)?;
        LINKS_CREATED.with_label_values(&[chain.as_str()]).inc();

        Ok(MsgResult::new(
            address.into_bytes(),
            format!("deposit address {} linked to {}", deposit, recipient),
        ))
    }

    fn track(&self, target: TrackTarget, rescan: bool) -> Result<MsgResult, HandlerError> {
        let (chain, adapter) = self.resolve_chain(&ChainName::bitcoin())?;
        let network = match adapter {
            ChainAdapter::Bitcoin { network, .. } => network,
            ChainAdapter::Evm { .. } => return Err(HandlerError::UnknownChain(chain.to_string())),
        };

        let (address, label) = match target {
            TrackTarget::Address(address) => {
                address
                    .parse::<bitcoin::Address<NetworkUnchecked>>()
                    .map_err(|e| HandlerError::InvalidMessage(format!("address {}: {}", address, e)))?
                    .require_network(network)
                    .map_err(|e| HandlerError::InvalidMessage(format!("address {}: {}", address, e)))?;
                (address, "external".to_string())
            }
            TrackTarget::Key(key_id) => {
                let key = self
                    .signer
                    .key(&key_id)
                    .ok_or_else(|| HandlerError::NoMasterKey(key_id.to_string()))?;
                let derived = self.deriver.bitcoin_deposit_address(&key.public_key, None)?;
                (derived.address_string(), key.id.to_string())
            }
            TrackTarget::CurrentKey => {
                let key = self.current_key(&chain)?;
                let derived = self.deriver.bitcoin_deposit_address(&key.public_key, None)?;
                (derived.address_string(), key.id.to_string())
            }
        };

        self.ledger.set_tracked_address(&chain, &address)?;

        let queued = self.rescan.as_ref().is_some_and(|handle| {
            handle.request(RescanRequest {
                address: address.clone(),
                label,
                rescan,
            })
        });
        let log = if queued {
            format!("tracking {}; import queued", address)
        } else {
            format!("tracking {}; import not queued", address)
        };
        Ok(MsgResult::new(address.into_bytes(), log))
    }

    // =========================================================================
    // VERIFICATION AND VOTING
    // =========================================================================

    async fn verify_deposit(&self, chain: &ChainName, deposit: Deposit) -> Result<MsgResult, HandlerError> {
        let (chain, adapter) = self.resolve_chain(chain)?;
        let deposit = deposit.canonical()?;
        match (&deposit, adapter.is_bitcoin()) {
            (Deposit::OutPoint(_), true) => {}
            (Deposit::Erc20(d), false) => {
                let burner = format_evm_address(&d.burner_address);
                let info = self
                    .deriver
                    .burner_info(&chain, &d.burner_address)?
                    .ok_or_else(|| HandlerError::InvalidMessage(format!("unknown burner address {}", burner)))?;
                if info.symbol != d.symbol {
                    return Err(HandlerError::InvalidMessage(format!(
                        "burner {} receives {}, not {}",
                        burner, info.symbol, d.symbol
                    )));
                }
            }
            _ => {
                return Err(HandlerError::InvalidMessage(format!(
                    "deposit kind does not match {} chain {}",
                    adapter.family(),
                    chain
                )))
            }
        }
        let client = self.client(&chain)?;

        let id = self.ledger.record_unverified(&chain, &deposit)?;
        let poll = PollMeta::new(chain.namespace(), DEPOSIT_POLL, id.as_str());
        self.voter.init_poll(&poll)?;

        let claim = ClaimedEvent::from(&deposit).with_min_confirmations(adapter.min_confirmations());
        let engine = VerificationEngine::new(client);
        let (value, mut log) = match engine.verify(&claim).await {
            Ok(_) => (true, format!("deposit {} verified", id)),
            Err(e) => (false, format!("deposit {} not verified: {}", id, e)),
        };

        self.cast_vote(&chain, &poll, value, &mut log)?;
        Ok(MsgResult::new(poll.to_string().into_bytes(), log))
    }

    async fn verify_token_deploy(
        &self,
        chain: &ChainName,
        tx_id: &str,
        symbol: String,
    ) -> Result<MsgResult, HandlerError> {
        let (chain, adapter) = self.resolve_evm_chain(chain)?;
        let tx_hash = parse_tx_hash(tx_id)?;
        let token = format_evm_address(&self.deriver.token_address(&chain, &symbol)?);
        let client = self.client(&chain)?;

        let tx_id = format!("0x{}", hex::encode(tx_hash));
        let poll = PollMeta::new(chain.namespace(), TOKEN_DEPLOY_POLL, tx_id.as_str());
        self.voter.init_poll(&poll)?;
        self.ledger.set_pending_token_deployment(
            &chain,
            &poll,
            &TokenDeployment {
                tx_id: tx_hash,
                symbol: symbol.clone(),
            },
        )?;

        // A deployment moves no value; the event is the contract appearing
        // at its derived address.
        let claim = ClaimedEvent {
            reference: EventRef::account(tx_id.as_str(), token.as_str()),
            recipient: token.clone(),
            amount: U256::zero(),
            confirmations: adapter.min_confirmations(),
        };
        let engine = VerificationEngine::new(client);
        let (value, mut log) = match engine.verify(&claim).await {
            Ok(_) => (true, format!("token {} deployed at {}", symbol, token)),
            Err(e) => (false, format!("token {} deployment not verified: {}", symbol, e)),
        };

        self.cast_vote(&chain, &poll, value, &mut log)?;
        Ok(MsgResult::new(poll.to_string().into_bytes(), log))
    }

    fn vote(&self, poll: &PollMeta, voter: &str, value: bool) -> Result<MsgResult, HandlerError> {
        self.voter.record_vote(poll, voter, value)?;
        let log = match self.voter.result(poll)? {
            Some(decision) => self.apply_decision(poll, decision)?,
            None => format!("vote by {} recorded in {}", voter, poll),
        };
        Ok(MsgResult::new(Vec::new(), log))
    }

    /// Cast this validator's vote. A refused vote is reported in the log,
    /// not as an error, so the verification outcome is kept.
    fn cast_vote(
        &self,
        chain: &ChainName,
        poll: &PollMeta,
        value: bool,
        log: &mut String,
    ) -> Result<(), HandlerError> {
        let label = if value { "true" } else { "false" };
        VOTES_CAST.with_label_values(&[chain.as_str(), label]).inc();

        if let Err(e) = self.voter.record_vote(poll, &self.config.voting.validator, value) {
            warn!("[runtime] Vote on {} not recorded: {}", poll, e);
            log.push_str(&format!("; vote not recorded: {}", e));
            return Ok(());
        }
        info!("[runtime] Voted {} on {}", value, poll);

        if let Some(decision) = self.voter.result(poll)? {
            let applied = self.apply_decision(poll, decision)?;
            log.push_str("; ");
            log.push_str(&applied);
        }
        Ok(())
    }

    fn apply_decision(&self, poll: &PollMeta, outcome: bool) -> Result<String, HandlerError> {
        let (chain, _) = self.resolve_chain(&ChainName::new(poll.module.clone()))?;
        let log = match poll.poll_type.as_str() {
            DEPOSIT_POLL => self.apply_deposit(&chain, &DepositId::from_raw(poll.id.clone()), outcome)?,
            TOKEN_DEPLOY_POLL => self.apply_token_deploy(&chain, poll, outcome)?,
            other => {
                return Err(HandlerError::InvalidMessage(format!("unknown poll type {}", other)));
            }
        };
        self.voter.delete_poll(poll);
        info!("[runtime] Poll {} decided {}", poll, outcome);
        Ok(log)
    }

    fn apply_deposit(&self, chain: &ChainName, id: &DepositId, outcome: bool) -> Result<String, HandlerError> {
        let (deposit, _) = self
            .ledger
            .query(chain, id)?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        let state = self.ledger.transition(chain, id, outcome)?;

        if !outcome {
            DEPOSITS_REJECTED.with_label_values(&[chain.as_str()]).inc();
            return Ok(format!("deposit {} {}", id, state));
        }
        DEPOSITS_VERIFIED.with_label_values(&[chain.as_str()]).inc();
        if deposit.is_tokenized() {
            self.ledger.confirm(chain, id)?;
        }

        let address = CrossChainAddress::new(chain.clone(), deposit.recipient());
        if deposit.amount().is_zero() {
            return Ok(format!("deposit {} accepted; nothing to transfer", id));
        }
        match self.registry.try_resolve(&address)? {
            Some(_) => {
                let transfer = self.registry.enqueue(&address, deposit.amount(), deposit.asset())?;
                Ok(format!(
                    "deposit {} accepted; transfer {} queued for {}",
                    id, transfer.id, transfer.recipient
                ))
            }
            None => Ok(format!("deposit {} accepted; {} is not linked", id, address)),
        }
    }

    fn apply_token_deploy(&self, chain: &ChainName, poll: &PollMeta, outcome: bool) -> Result<String, HandlerError> {
        let pending = self
            .ledger
            .pending_token_deployment(chain, poll)?
            .ok_or_else(|| LedgerError::NotFound(format!("token deployment for {}", poll)))?;
        if outcome {
            self.deriver.confirm_token(chain, &pending.symbol)?;
        }
        self.ledger.delete_pending_token_deployment(chain, poll)?;

        Ok(if outcome {
            format!("token {} confirmed on {}", pending.symbol, chain)
        } else {
            format!("token {} deployment rejected on {}", pending.symbol, chain)
        })
    }

    // =========================================================================
    // SIGNING
    // =========================================================================

    fn sign_deploy_token(&self, chain: &ChainName, params: TokenDeployParams) -> Result<MsgResult, HandlerError> {
        let (chain, _) = self.resolve_evm_chain(chain)?;
        let info = self.deriver.register_token(&chain, params)?;
        let address = self.deriver.token_address(&chain, &info.symbol)?;
        Ok(MsgResult::new(
            address.to_vec(),
            format!("token {} will deploy at {}", info.symbol, format_evm_address(&address)),
        ))
    }

    fn sign_tx(&self, chain: &ChainName, id: &str, tx: UnsignedTx) -> Result<MsgResult, HandlerError> {
        let (chain, _) = self.resolve_chain(chain)?;
        self.pipeline.set_unsigned_tx(&chain, id, tx)?;
        let hash = self.pipeline.compute_signing_hash(&chain, id)?;

        let key = self.current_key(&chain)?;
        let snapshot = self
            .signer
            .snapshot_for_key(&key.id)
            .ok_or_else(|| HandlerError::NoSnapshot(key.id.to_string()))?;
        self.pipeline
            .request_signature(&chain, id, &key.id, &hash, &snapshot.validators)?;
        SIGNATURES_REQUESTED.with_label_values(&[chain.as_str()]).inc();

        Ok(MsgResult::new(
            hash.to_vec(),
            format!(
                "signing {} on {} with key {} (round {})",
                id, chain, key.id, snapshot.round
            ),
        ))
    }

    async fn assemble_tx(
        &self,
        chain: &ChainName,
        id: &str,
        signature: &ThresholdSignature,
        broadcast: bool,
    ) -> Result<MsgResult, HandlerError> {
        let (chain, _) = self.resolve_chain(chain)?;
        let record = self
            .pipeline
            .record(&chain, id)?
            .ok_or_else(|| SigningError::NoUnsignedTx(id.to_string()))?;

        let key_id = match record.key_id {
            Some(key_id) => key_id,
            None => self.current_key(&chain)?.id,
        };
        let key = self
            .signer
            .key(&key_id)
            .ok_or_else(|| HandlerError::NoMasterKey(key_id.to_string()))?;

        let signed = self
            .pipeline
            .assemble_signed(&chain, id, &key.public_key, signature)?;
        if record.state != PipelineState::Signed {
            TRANSACTIONS_ASSEMBLED.with_label_values(&[chain.as_str()]).inc();
        }

        let mut log = format!("assembled {} as {}", id, signed.tx_hash);
        if broadcast {
            let node_hash = self.client(&chain)?.send_raw_transaction(&signed.raw, false).await?;
            info!("[runtime] Broadcast {} on {} as {}", id, chain, node_hash);
            log.push_str(&format!("; broadcast as {}", node_hash));
        }
        Ok(MsgResult::new(signed.raw, log))
    }

    // =========================================================================
    // TRANSFERS
    // =========================================================================

    // Transfers are kept under the recipient chain, which need not be one
    // this validator watches.
    fn pending_transfers(&self, chain: &ChainName) -> Result<MsgResult, HandlerError> {
        let transfers = self.registry.pending_transfers(chain)?;
        let log = format!("{} pending transfers to {}", transfers.len(), chain);
        Ok(MsgResult::new(serde_json::to_vec(&transfers)?, log))
    }

    fn archive_transfer(&self, chain: &ChainName, id: u64) -> Result<MsgResult, HandlerError> {
        self.registry.archive(chain, id)?;
        Ok(MsgResult::new(Vec::new(), format!("transfer {} to {} archived", id, chain)))
    }
}

fn parse_tx_hash(s: &str) -> Result<Hash, HandlerError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped)
        .map_err(|e| HandlerError::InvalidMessage(format!("tx id {}: {}", s, e)))?;
    Hash::try_from(bytes.as_slice())
        .map_err(|_| HandlerError::InvalidMessage(format!("tx id {}: expected 32 bytes", s)))
}
