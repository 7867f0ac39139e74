//! # Signing Flow
//!
//! Confirmed deposits feed an outgoing transaction through the signing
//! pipeline, with the signature produced outside as the threshold protocol
//! would.
//!
//! ```text
//! DepositLedger::query_all_confirmed ──→ UnsignedTx
//!                                          │
//!   SetUnsignedTx → ComputeSigningHash → RequestSignature
//!                                          │
//!                      external signature ─┴─→ AssembleSigned
//! ```

#[cfg(test)]
mod tests {
    use k256::ecdsa::SigningKey;
    use primitive_types::U256;
    use rand::rngs::OsRng;
    use shared_types::{
        ChainName, Hash, InMemoryKVStore, KeyId, Snapshot, ThresholdKey, ThresholdSignature,
    };
    use std::sync::Arc;
    use tb_01_address_derivation::{keccak256, AddressDeriver, DerivationConfig};
    use tb_02_deposit_ledger::{Deposit, DepositLedger, DepositLedgerApi, DepositState, Erc20Deposit};
    use tb_04_signing_pipeline::{
        EvmTransaction, InMemorySigner, LedgerInputSource, PipelineConfig, PipelineState,
        SigningError, SigningPipeline, SigningPipelineApi, UnsignedTx,
    };

    type Pipeline = SigningPipeline<InMemoryKVStore, LedgerInputSource<InMemoryKVStore>, InMemorySigner>;

    struct Setup {
        ledger: DepositLedger<InMemoryKVStore>,
        pipeline: Pipeline,
        signer: Arc<InMemorySigner>,
        key: SigningKey,
    }

    fn eth() -> ChainName {
        ChainName::new("Ethereum")
    }

    fn public_key(key: &SigningKey) -> Vec<u8> {
        key.verifying_key().to_encoded_point(true).as_bytes().to_vec()
    }

    fn setup() -> Setup {
        let store = Arc::new(InMemoryKVStore::new());
        let ledger = DepositLedger::new(Arc::clone(&store));
        let deriver = AddressDeriver::new(Arc::clone(&store), DerivationConfig::default());
        let inputs = Arc::new(LedgerInputSource::new(ledger.clone(), deriver));

        let key = SigningKey::random(&mut OsRng);
        let signer = Arc::new(InMemorySigner::new());
        signer.add_key(
            ThresholdKey {
                id: KeyId::new("master-1"),
                public_key: public_key(&key),
            },
            Snapshot {
                round: 3,
                validators: vec![],
            },
        );

        let pipeline = SigningPipeline::new(
            store,
            inputs,
            Arc::clone(&signer),
            PipelineConfig::default().with_evm_chain(eth(), 5),
        );
        Setup {
            ledger,
            pipeline,
            signer,
            key,
        }
    }

    fn token_deposit(tx: u8) -> Deposit {
        Deposit::Erc20(Erc20Deposit {
            tx_id: [tx; 32],
            burner_address: [0xbb; 20],
            amount: U256::from(1_000 * tx as u64),
            symbol: "satoshi".into(),
            confirmations: 12,
        })
    }

    fn sign(key: &SigningKey, hash: &Hash) -> ThresholdSignature {
        let (sig, _) = key.sign_prehash_recoverable(hash).unwrap();
        let (r, s) = sig.split_scalars();
        ThresholdSignature {
            r: r.to_bytes().into(),
            s: s.to_bytes().into(),
        }
    }

    fn settle_tx(setup: &Setup) -> UnsignedTx {
        let deposits = setup
            .ledger
            .query_all_confirmed(&eth())
            .unwrap()
            .map(|d| d.unwrap().id())
            .collect();
        UnsignedTx::Evm(EvmTransaction {
            nonce: 4,
            gas_price: U256::from(30_000_000_000u64),
            gas_limit: 250_000,
            to: Some([0x44; 20]),
            value: U256::zero(),
            data: vec![0xde, 0xad, 0xbe, 0xef],
            deposits,
        })
    }

    #[test]
    fn test_confirmed_deposits_round_trip() {
        let s = setup();
        for tx in 1..=3 {
            let id = s.ledger.record_unverified(&eth(), &token_deposit(tx)).unwrap();
            s.ledger.transition(&eth(), &id, true).unwrap();
            s.ledger.confirm(&eth(), &id).unwrap();
        }

        let tx = settle_tx(&s);
        assert_eq!(tx.input_ids().len(), 3);
        s.pipeline.set_unsigned_tx(&eth(), "burn-1", tx).unwrap();
        let hash = s.pipeline.compute_signing_hash(&eth(), "burn-1").unwrap();
        s.pipeline
            .request_signature(&eth(), "burn-1", &KeyId::new("master-1"), &hash, &[])
            .unwrap();
        assert_eq!(s.signer.requests()[0].sig_id, hex::encode(hash));

        let signed = s
            .pipeline
            .assemble_signed(&eth(), "burn-1", &public_key(&s.key), &sign(&s.key, &hash))
            .unwrap();
        assert!(signed.raw[0] >= 0xc0);
        assert_eq!(signed.tx_hash, format!("0x{}", hex::encode(keccak256(&signed.raw))));

        let record = s.pipeline.record(&eth(), "burn-1").unwrap().unwrap();
        assert_eq!(record.state, PipelineState::Signed);
        assert_eq!(s.pipeline.signed_tx(&eth(), "burn-1").unwrap(), Some(signed));
    }

    #[test]
    fn test_unverified_input_blocks_until_transition() {
        let s = setup();
        let d = token_deposit(1);
        let id = s.ledger.record_unverified(&eth(), &d).unwrap();
        let tx = UnsignedTx::Evm(EvmTransaction {
            nonce: 0,
            gas_price: U256::from(1),
            gas_limit: 21_000,
            to: Some([0x44; 20]),
            value: U256::zero(),
            data: vec![],
            deposits: vec![id.clone()],
        });

        assert!(matches!(
            s.pipeline.set_unsigned_tx(&eth(), "burn-1", tx.clone()),
            Err(SigningError::UnverifiedInput { .. })
        ));
        assert_eq!(s.ledger.transition(&eth(), &id, true).unwrap(), DepositState::Verified);
        s.pipeline.set_unsigned_tx(&eth(), "burn-1", tx).unwrap();
    }

    #[test]
    fn test_signature_from_other_key_rejected() {
        let s = setup();
        let id = s.ledger.record_unverified(&eth(), &token_deposit(1)).unwrap();
        s.ledger.transition(&eth(), &id, true).unwrap();
        s.ledger.confirm(&eth(), &id).unwrap();
        s.pipeline.set_unsigned_tx(&eth(), "burn-1", settle_tx(&s)).unwrap();
        let hash = s.pipeline.compute_signing_hash(&eth(), "burn-1").unwrap();
        s.pipeline
            .request_signature(&eth(), "burn-1", &KeyId::new("master-1"), &hash, &[])
            .unwrap();

        let stranger = SigningKey::random(&mut OsRng);
        assert!(matches!(
            s.pipeline
                .assemble_signed(&eth(), "burn-1", &public_key(&s.key), &sign(&stranger, &hash)),
            Err(SigningError::SignatureMismatch(_))
        ));
        assert!(s.pipeline.signed_tx(&eth(), "burn-1").unwrap().is_none());
    }
}
