//! # Deposit Flow
//!
//! A claimed deposit is recorded, checked against the chain and settled in
//! the ledger by the poll outcome.
//!
//! ```text
//! claim ──→ DepositLedger (Unverified)
//!             │
//!             ↓
//!       VerificationEngine ──vote──→ Transition(outcome)
//!                                        │
//!                         Verified ←─────┴─────→ Rejected (deleted)
//! ```

#[cfg(test)]
mod tests {
    use primitive_types::U256;
    use shared_types::{ChainName, InMemoryKVStore};
    use std::sync::Arc;
    use tb_02_deposit_ledger::{Deposit, DepositLedger, DepositLedgerApi, DepositState, OutPointInfo};
    use tb_03_verification::{
        ClaimedEvent, EventRef, MockChainDataClient, ObservedEvent, VerificationApi,
        VerificationEngine, VerificationError,
    };

    // =========================================================================
    // FIXTURES
    // =========================================================================

    const TXID: &str = "0e3e2357e806b6cdb1f70b54c3a3a17b6714ee1f0e68bebb44a74b1efd512098";

    fn deposit(amount: u64, confirmations: u64) -> Deposit {
        Deposit::OutPoint(OutPointInfo {
            tx_id: TXID.into(),
            vout: 0,
            recipient: "1A2B".into(),
            amount,
            confirmations,
        })
    }

    fn engine() -> VerificationEngine<MockChainDataClient> {
        let client = MockChainDataClient::new("regtest").with_event(
            EventRef::outpoint(TXID, 0),
            ObservedEvent {
                recipient: "1A2B".into(),
                amount: U256::from(5000),
                confirmations: 3,
            },
        );
        VerificationEngine::new(Arc::new(client))
    }

    fn ledger() -> DepositLedger<InMemoryKVStore> {
        DepositLedger::new(Arc::new(InMemoryKVStore::new()))
    }

    // =========================================================================
    // VERIFICATION SCENARIOS
    // =========================================================================

    #[tokio::test]
    async fn test_enough_confirmations_verifies() {
        let claim = ClaimedEvent::from(&deposit(5000, 1));
        assert!(engine().verify(&claim).await.is_ok());
    }

    #[tokio::test]
    async fn test_too_few_confirmations_rejected() {
        let claim = ClaimedEvent::from(&deposit(5000, 10));
        assert_eq!(
            engine().verify(&claim).await,
            Err(VerificationError::InsufficientConfirmations {
                required: 10,
                actual: 3
            })
        );
    }

    #[tokio::test]
    async fn test_amount_mismatch_wins_over_matching_fields() {
        let claim = ClaimedEvent::from(&deposit(4000, 3));
        assert!(matches!(
            engine().verify(&claim).await,
            Err(VerificationError::AmountMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_chain_minimum_raises_claimed_confirmations() {
        let claim = ClaimedEvent::from(&deposit(5000, 1)).with_min_confirmations(6);
        assert!(!engine().vote(&claim).await);
    }

    // =========================================================================
    // LEDGER SETTLEMENT
    // =========================================================================

    #[tokio::test]
    async fn test_vote_settles_ledger() {
        let btc = ChainName::bitcoin();
        let ledger = ledger();
        let d = deposit(5000, 1);
        let id = ledger.record_unverified(&btc, &d).unwrap();

        let outcome = engine().vote(&ClaimedEvent::from(&d)).await;
        assert!(outcome);
        assert_eq!(ledger.transition(&btc, &id, outcome).unwrap(), DepositState::Verified);
        // Repeating the outcome changes nothing.
        assert_eq!(ledger.transition(&btc, &id, outcome).unwrap(), DepositState::Verified);
        assert_eq!(ledger.query(&btc, &id).unwrap(), Some((d, DepositState::Verified)));
        assert!(ledger.is_spendable(&btc, &id).unwrap());
    }

    #[tokio::test]
    async fn test_negative_vote_removes_claim() {
        let btc = ChainName::bitcoin();
        let ledger = ledger();
        let d = deposit(5000, 10);
        let id = ledger.record_unverified(&btc, &d).unwrap();

        let outcome = engine().vote(&ClaimedEvent::from(&d)).await;
        assert!(!outcome);
        ledger.transition(&btc, &id, outcome).unwrap();
        assert_eq!(ledger.query(&btc, &id).unwrap(), None);

        // The claim may be resubmitted once it has enough confirmations.
        let retry = deposit(5000, 3);
        assert_eq!(ledger.record_unverified(&btc, &retry).unwrap(), id);
    }
}
