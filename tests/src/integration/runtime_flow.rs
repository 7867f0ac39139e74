//! # Runtime Flow
//!
//! JSON messages driven through `BridgeHandler` the way the runtime's
//! stdin loop feeds them, with a second validator voting from outside.

#[cfg(test)]
mod tests {
    use bridge_runtime::{BridgeConfig, BridgeHandler, BridgeMsg, HandlerError, InMemoryVoter};
    use k256::ecdsa::SigningKey;
    use primitive_types::U256;
    use rand::rngs::OsRng;
    use shared_types::{ChainName, InMemoryKVStore, KeyId, Snapshot, ThresholdKey};
    use std::sync::Arc;
    use tb_02_deposit_ledger::{DepositId, DepositLedgerApi, DepositState};
    use tb_03_verification::{EventRef, MockChainDataClient, ObservedEvent};
    use tb_04_signing_pipeline::InMemorySigner;
    use tb_05_link_registry::{CrossChainTransfer, TransferState};

    const FUNDING_TX: &str = "9b0fc92260312ce44e74ef369f5c66bbb85848f2eddd5a7a1cde251e54ccfdd5";

    const CONFIG: &str = r#"
[bitcoin]
network = "regtest"
confirmations = 2

[voting]
threshold = 2
validator = "validator-0"
"#;

    type Handler = BridgeHandler<InMemoryKVStore, InMemorySigner>;

    fn handler() -> (Handler, Arc<MockChainDataClient>) {
        let config = BridgeConfig::parse(CONFIG).unwrap();
        let threshold = config.voting.threshold;

        let key = SigningKey::random(&mut OsRng);
        let signer = Arc::new(InMemorySigner::new());
        signer.add_key(
            ThresholdKey {
                id: KeyId::new("master-1"),
                public_key: key.verifying_key().to_encoded_point(true).as_bytes().to_vec(),
            },
            Snapshot {
                round: 1,
                validators: vec![],
            },
        );
        signer.set_current_key(ChainName::bitcoin(), KeyId::new("master-1"));

        let client = Arc::new(MockChainDataClient::new("regtest"));
        let handler = BridgeHandler::new(
            config,
            Arc::new(InMemoryKVStore::new()),
            signer,
            Arc::new(InMemoryVoter::new(threshold)),
        )
        .unwrap()
        .with_chain_client(&ChainName::bitcoin(), client.clone());
        (handler, client)
    }

    async fn send(handler: &Handler, json: &str) -> Result<Vec<u8>, HandlerError> {
        let msg: BridgeMsg = serde_json::from_str(json).unwrap();
        handler.handle(msg).await.map(|r| r.data)
    }

    async fn link(handler: &Handler) -> String {
        let data = send(
            handler,
            r#"{"type": "link", "chain": "Bitcoin", "recipient": {"chain": "Axelar", "address": "axelar1dest"}}"#,
        )
        .await
        .unwrap();
        String::from_utf8(data).unwrap()
    }

    async fn claim_deposit(handler: &Handler, address: &str) -> String {
        let json = serde_json::json!({
            "type": "verify_deposit",
            "chain": "bitcoin",
            "deposit": {"OutPoint": {
                "tx_id": FUNDING_TX,
                "vout": 1,
                "recipient": address,
                "amount": 25_000,
                "confirmations": 1
            }}
        });
        let data = send(handler, &json.to_string()).await.unwrap();
        String::from_utf8(data).unwrap()
    }

    fn vote(voter: &str, id: &str, value: bool) -> String {
        serde_json::json!({
            "type": "vote",
            "poll": {"module": "bitcoin", "poll_type": "deposit", "id": id},
            "voter": voter,
            "value": value
        })
        .to_string()
    }

    fn seed_event(client: &MockChainDataClient, address: &str, confirmations: u64) {
        client.insert_event(
            EventRef::outpoint(FUNDING_TX, 1),
            ObservedEvent {
                recipient: address.into(),
                amount: U256::from(25_000),
                confirmations,
            },
        );
    }

    async fn pending(handler: &Handler) -> Vec<CrossChainTransfer> {
        let data = send(handler, r#"{"type": "pending_transfers", "chain": "Axelar"}"#)
            .await
            .unwrap();
        serde_json::from_slice(&data).unwrap()
    }

    #[tokio::test]
    async fn test_second_validator_settles_deposit() {
        let (handler, client) = handler();
        let address = link(&handler).await;
        seed_event(&client, &address, 6);

        let poll = claim_deposit(&handler, &address).await;
        assert!(poll.ends_with(&format!("{}:1", FUNDING_TX)), "{}", poll);
        assert!(pending(&handler).await.is_empty());

        let id = DepositId::outpoint(FUNDING_TX, 1);
        send(&handler, &vote("validator-1", id.as_str(), true)).await.unwrap();

        let (_, state) = handler
            .ledger()
            .query(&ChainName::bitcoin(), &id)
            .unwrap()
            .unwrap();
        assert_eq!(state, DepositState::Verified);

        let transfers = pending(&handler).await;
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].deposit_address.address, address);
        assert_eq!(transfers[0].amount, U256::from(25_000));

        let archive = serde_json::json!({"type": "archive_transfer", "chain": "Axelar", "id": transfers[0].id});
        send(&handler, &archive.to_string()).await.unwrap();
        assert!(pending(&handler).await.is_empty());
        assert_eq!(
            handler
                .registry()
                .transfer(&ChainName::new("Axelar"), transfers[0].id)
                .unwrap()
                .map(|t| t.state),
            Some(TransferState::Archived)
        );
    }

    #[tokio::test]
    async fn test_outvoted_deposit_is_dropped() {
        let (handler, client) = handler();
        let address = link(&handler).await;
        // Below the configured two confirmations: this validator votes no.
        seed_event(&client, &address, 1);
        claim_deposit(&handler, &address).await;

        let id = DepositId::outpoint(FUNDING_TX, 1);
        send(&handler, &vote("validator-1", id.as_str(), false)).await.unwrap();

        assert!(handler.ledger().query(&ChainName::bitcoin(), &id).unwrap().is_none());
        assert!(pending(&handler).await.is_empty());

        // The claim may be submitted again once the chain has caught up.
        seed_event(&client, &address, 6);
        claim_deposit(&handler, &address).await;
        let (_, state) = handler
            .ledger()
            .query(&ChainName::bitcoin(), &id)
            .unwrap()
            .unwrap();
        assert_eq!(state, DepositState::Unverified);
    }

    #[tokio::test]
    async fn test_malformed_messages_rejected() {
        let (handler, _) = handler();
        assert!(serde_json::from_str::<BridgeMsg>(r#"{"type": "link", "chain": "Bitcoin"}"#).is_err());

        let result = send(
            &handler,
            r#"{"type": "verify_token_deploy", "chain": "Bitcoin", "tx_id": "00", "symbol": "satoshi"}"#,
        )
        .await;
        assert!(result.is_err());

        let result = send(&handler, &vote("validator-1", "nothing:0", true)).await;
        assert!(matches!(result, Err(HandlerError::Voter(_))));
    }
}
