//! # Link Flow
//!
//! Derived deposit addresses bound to internal recipients.

#[cfg(test)]
mod tests {
    use k256::ecdsa::SigningKey;
    use rand::rngs::OsRng;
    use shared_types::{ChainName, CrossChainAddress, InMemoryKVStore};
    use std::sync::Arc;
    use tb_01_address_derivation::{
        AddressDerivationApi, AddressDeriver, DepositSource, DerivationConfig, DerivedAddress,
        EvmBytecodes, TokenDeployParams,
    };
    use tb_05_link_registry::{LinkError, LinkRegistry, LinkRegistryApi};

    fn eth() -> ChainName {
        ChainName::new("Ethereum")
    }

    fn setup() -> (AddressDeriver<InMemoryKVStore>, LinkRegistry<InMemoryKVStore>) {
        let store = Arc::new(InMemoryKVStore::new());
        let config = DerivationConfig::default().with_evm_chain(
            eth(),
            EvmBytecodes {
                token: vec![0x60, 0x80, 0x60, 0x40],
                burner: vec![0x60, 0x80, 0x60, 0x41],
            },
        );
        (
            AddressDeriver::new(Arc::clone(&store), config),
            LinkRegistry::new(store),
        )
    }

    #[test]
    fn test_link_once_then_already_linked() {
        let (_, registry) = setup();
        let x = CrossChainAddress::new(ChainName::bitcoin(), "bcrt1qdeposit");
        let r1 = CrossChainAddress::new("Axelar", "R1");
        let r2 = CrossChainAddress::new("Axelar", "R2");

        registry.link(&x, &r1).unwrap();
        assert!(matches!(
            registry.link(&x, &r2),
            Err(LinkError::AlreadyLinked { .. })
        ));
        assert_eq!(registry.resolve(&x).unwrap(), r1);
    }

    #[test]
    fn test_bitcoin_addresses_per_recipient() {
        let (deriver, registry) = setup();
        let key = SigningKey::random(&mut OsRng);
        let pubkey = key.verifying_key().to_encoded_point(true).as_bytes().to_vec();
        let r1 = CrossChainAddress::new("Axelar", "R1");
        let r2 = CrossChainAddress::new("Axelar", "R2");

        let a1 = deriver
            .derive_deposit_address(&ChainName::bitcoin(), DepositSource::PublicKey(&pubkey), &r1)
            .unwrap();
        let a2 = deriver
            .derive_deposit_address(&ChainName::bitcoin(), DepositSource::PublicKey(&pubkey), &r2)
            .unwrap();
        assert_ne!(a1.address_string(), a2.address_string());

        let d1 = CrossChainAddress::new(ChainName::bitcoin(), a1.address_string());
        let d2 = CrossChainAddress::new(ChainName::bitcoin(), a2.address_string());
        registry.link(&d1, &r1).unwrap();
        registry.link(&d2, &r2).unwrap();
        assert_eq!(registry.resolve(&d2).unwrap(), r2);

        // The spend script was cached when the address was derived.
        assert!(deriver.deposit_script(&a1.address_string()).unwrap().is_some());
    }

    #[test]
    fn test_burner_address_links_back_to_recipient() {
        let (deriver, registry) = setup();
        deriver.set_gateway_address(&eth(), [0x22; 20]).unwrap();
        deriver
            .register_token(
                &eth(),
                TokenDeployParams {
                    token_name: "Satoshi".into(),
                    symbol: "satoshi".into(),
                    decimals: 8,
                    capacity: "2100000000000000".into(),
                },
            )
            .unwrap();
        deriver.confirm_token(&eth(), "satoshi").unwrap();

        let recipient = CrossChainAddress::new("Axelar", "axelar1recipient");
        let derived = deriver
            .derive_deposit_address(&eth(), DepositSource::Token("satoshi"), &recipient)
            .unwrap();
        let burner = match &derived {
            DerivedAddress::Evm { address, info } => {
                assert_eq!(info.symbol, "satoshi");
                *address
            }
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(
            deriver.burner_info(&eth(), &burner).unwrap().map(|i| i.symbol),
            Some("satoshi".to_string())
        );

        let deposit = CrossChainAddress::new(eth(), derived.address_string());
        registry.link(&deposit, &recipient).unwrap();
        assert_eq!(registry.deposit_addresses(&recipient).unwrap(), vec![deposit]);
    }

    #[test]
    fn test_burner_needs_confirmed_token() {
        let (deriver, _) = setup();
        deriver.set_gateway_address(&eth(), [0x22; 20]).unwrap();
        let recipient = CrossChainAddress::new("Axelar", "axelar1recipient");
        assert!(deriver
            .derive_deposit_address(&eth(), DepositSource::Token("satoshi"), &recipient)
            .is_err());
    }
}
