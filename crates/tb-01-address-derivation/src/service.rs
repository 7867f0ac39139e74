//! # Address Derivation Service
//!
//! Implements [`AddressDerivationApi`] over a key-value store. Derived
//! addresses are cached so later lookups (burner metadata, spend scripts)
//! do not need the derivation inputs again.

use crate::domain::deposit_script::{deposit_address, deposit_script};
use crate::domain::keys::{self, key};
use crate::domain::{
    derive_burner_address, derive_token_address, format_evm_address, BurnerInfo, DepositSource,
    DerivationConfig, DerivationError, DerivedAddress, EvmBytecodes, TokenDeployParams, TokenInfo,
};
use crate::ports::AddressDerivationApi;
use shared_types::{Address, ChainName, ChainStore, CrossChainAddress, KeyValueStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Address derivation service.
pub struct AddressDeriver<S: ?Sized> {
    store: Arc<S>,
    config: DerivationConfig,
}

impl<S: ?Sized> Clone for AddressDeriver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: KeyValueStore + ?Sized> AddressDeriver<S> {
    /// Create a deriver over `store`.
    pub fn new(store: Arc<S>, config: DerivationConfig) -> Self {
        Self { store, config }
    }

    /// Derivation parameters.
    pub fn config(&self) -> &DerivationConfig {
        &self.config
    }

    fn view(&self, chain: &ChainName) -> ChainStore<'_, S> {
        ChainStore::new(self.store.as_ref(), chain)
    }

    fn bytecodes(&self, chain: &ChainName) -> Result<&EvmBytecodes, DerivationError> {
        self.config
            .evm_chains
            .get(chain)
            .ok_or_else(|| DerivationError::UnsupportedChain(chain.to_string()))
    }

    fn require_gateway(&self, chain: &ChainName) -> Result<Address, DerivationError> {
        self.gateway_address(chain)?
            .ok_or_else(|| DerivationError::NotFound(format!("gateway address for {}", chain)))
    }

    /// Bitcoin deposit address for `public_key`, optionally scoped to a
    /// recipient. The witness script is cached by address.
    pub fn bitcoin_deposit_address(
        &self,
        public_key: &[u8],
        recipient: Option<&CrossChainAddress>,
    ) -> Result<DerivedAddress, DerivationError> {
        let script = deposit_script(public_key, recipient)?;
        let address = deposit_address(&script, self.config.bitcoin_network).to_string();

        self.view(&ChainName::bitcoin())
            .put(&key(keys::BTC_SCRIPT, &address), script.as_bytes())?;
        debug!("[tb-01] Derived bitcoin deposit address {}", address);

        Ok(DerivedAddress::Bitcoin {
            address,
            script: script.into_bytes(),
        })
    }

    /// Burner address for a confirmed token and a recipient. The burner
    /// metadata is cached by address.
    pub fn burner_address(
        &self,
        chain: &ChainName,
        symbol: &str,
        recipient: &CrossChainAddress,
    ) -> Result<(Address, BurnerInfo), DerivationError> {
        let bytecodes = self.bytecodes(chain)?;
        let token = self
            .token_info(chain, symbol)?
            .filter(|t| t.confirmed)
            .ok_or_else(|| DerivationError::NotFound(format!("confirmed token {} on {}", symbol, chain)))?;
        let gateway = self.require_gateway(chain)?;
        let token_address = self.token_address(chain, &token.symbol)?;

        let (address, info) =
            derive_burner_address(&gateway, &bytecodes.burner, token_address, symbol, recipient);

        let burner_key = key(keys::BURNER_ADDR, &hex::encode(address));
        let view = self.view(chain);
        if !view.exists(&burner_key)? {
            view.put_record(&burner_key, &info)?;
        }
        debug!(
            "[tb-01] Derived burner {} for {} on {}",
            format_evm_address(&address),
            recipient,
            chain
        );

        Ok((address, info))
    }
}

impl<S: KeyValueStore + ?Sized> AddressDerivationApi for AddressDeriver<S> {
    fn derive_deposit_address(
        &self,
        chain: &ChainName,
        source: DepositSource<'_>,
        recipient: &CrossChainAddress,
    ) -> Result<DerivedAddress, DerivationError> {
        match source {
            DepositSource::PublicKey(pk) if chain.is_bitcoin() => {
                self.bitcoin_deposit_address(pk, Some(recipient))
            }
            DepositSource::Token(symbol) if !chain.is_bitcoin() => {
                let (address, info) = self.burner_address(chain, symbol, recipient)?;
                Ok(DerivedAddress::Evm { address, info })
            }
            _ => Err(DerivationError::UnsupportedChain(format!(
                "{} cannot derive from {:?}",
                chain, source
            ))),
        }
    }

    fn set_gateway_address(&self, chain: &ChainName, address: Address) -> Result<(), DerivationError> {
        self.view(chain).put(keys::GATEWAY, &address)?;
        info!("[tb-01] Gateway for {} set to {}", chain, format_evm_address(&address));
        Ok(())
    }

    fn gateway_address(&self, chain: &ChainName) -> Result<Option<Address>, DerivationError> {
        match self.view(chain).get(keys::GATEWAY)? {
            Some(bz) => Address::try_from(bz.as_slice())
                .map(Some)
                .map_err(|_| DerivationError::EncodingError("stored gateway is not 20 bytes".into())),
            None => Ok(None),
        }
    }

    fn register_token(
        &self,
        chain: &ChainName,
        params: TokenDeployParams,
    ) -> Result<TokenInfo, DerivationError> {
        self.bytecodes(chain)?;
        let info = params.into_token_info()?;
        let view = self.view(chain);
        let symbol_key = key(keys::SYMBOL, &info.symbol);

        if let Some(existing) = view.get_record::<TokenInfo>(&symbol_key)? {
            if existing.same_params(&info) {
                return Ok(existing);
            }
            return Err(DerivationError::TokenExists {
                chain: chain.to_string(),
                symbol: info.symbol,
            });
        }

        view.put_record(&symbol_key, &info)?;
        info!("[tb-01] Registered token {} on {}", info.symbol, chain);
        Ok(info)
    }

    fn confirm_token(&self, chain: &ChainName, symbol: &str) -> Result<(), DerivationError> {
        let view = self.view(chain);
        let symbol_key = key(keys::SYMBOL, symbol);
        let mut token = view
            .get_record::<TokenInfo>(&symbol_key)?
            .ok_or_else(|| DerivationError::NotFound(format!("token {} on {}", symbol, chain)))?;

        if !token.confirmed {
            token.confirmed = true;
            view.put_record(&symbol_key, &token)?;
            info!("[tb-01] Token {} confirmed on {}", symbol, chain);
        }
        Ok(())
    }

    fn token_info(&self, chain: &ChainName, symbol: &str) -> Result<Option<TokenInfo>, DerivationError> {
        Ok(self.view(chain).get_record(&key(keys::SYMBOL, symbol))?)
    }

    fn token_address(&self, chain: &ChainName, symbol: &str) -> Result<Address, DerivationError> {
        let view = self.view(chain);
        let cache_key = key(keys::TOKEN_ADDR, symbol);
        if let Some(bz) = view.get(&cache_key)? {
            if let Ok(addr) = Address::try_from(bz.as_slice()) {
                return Ok(addr);
            }
        }

        let bytecodes = self.bytecodes(chain)?;
        let token = self
            .token_info(chain, symbol)?
            .ok_or_else(|| DerivationError::NotFound(format!("token {} on {}", symbol, chain)))?;
        let gateway = self.require_gateway(chain)?;

        let address = derive_token_address(&gateway, &bytecodes.token, &token);
        view.put(&cache_key, &address)?;
        debug!(
            "[tb-01] Token {} on {} resolves to {}",
            symbol,
            chain,
            format_evm_address(&address)
        );
        Ok(address)
    }

    fn burner_info(&self, chain: &ChainName, address: &Address) -> Result<Option<BurnerInfo>, DerivationError> {
        Ok(self
            .view(chain)
            .get_record(&key(keys::BURNER_ADDR, &hex::encode(address)))?)
    }

    fn deposit_script(&self, address: &str) -> Result<Option<Vec<u8>>, DerivationError> {
        Ok(self
            .view(&ChainName::bitcoin())
            .get(&key(keys::BTC_SCRIPT, address))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use rand::rngs::OsRng;
    use shared_types::InMemoryKVStore;

    fn eth() -> ChainName {
        ChainName::new("Ethereum")
    }

    fn deriver() -> AddressDeriver<InMemoryKVStore> {
        let config = DerivationConfig::default().with_evm_chain(
            eth(),
            EvmBytecodes {
                token: vec![0x60, 0x80, 0x60, 0x40],
                burner: vec![0x60, 0x80, 0x60, 0x41],
            },
        );
        AddressDeriver::new(Arc::new(InMemoryKVStore::new()), config)
    }

    fn params() -> TokenDeployParams {
        TokenDeployParams {
            token_name: "Satoshi".into(),
            symbol: "satoshi".into(),
            decimals: 8,
            capacity: "21000000".into(),
        }
    }

    fn recipient() -> CrossChainAddress {
        CrossChainAddress::new("Axelar", "axelar1recipient")
    }

    #[test]
    fn test_token_address_requires_gateway() {
        let d = deriver();
        d.register_token(&eth(), params()).unwrap();
        assert!(matches!(
            d.token_address(&eth(), "satoshi"),
            Err(DerivationError::NotFound(_))
        ));
    }

    #[test]
    fn test_token_address_requires_token_info() {
        let d = deriver();
        d.set_gateway_address(&eth(), [9u8; 20]).unwrap();
        assert!(matches!(
            d.token_address(&eth(), "satoshi"),
            Err(DerivationError::NotFound(_))
        ));
    }

    #[test]
    fn test_token_address_is_cached() {
        let d = deriver();
        d.set_gateway_address(&eth(), [9u8; 20]).unwrap();
        d.register_token(&eth(), params()).unwrap();
        let first = d.token_address(&eth(), "satoshi").unwrap();

        // Changing the gateway afterwards does not move an already derived token
        d.set_gateway_address(&eth(), [10u8; 20]).unwrap();
        assert_eq!(d.token_address(&eth(), "satoshi").unwrap(), first);
    }

    #[test]
    fn test_burner_requires_confirmed_token() {
        let d = deriver();
        d.set_gateway_address(&eth(), [9u8; 20]).unwrap();
        d.register_token(&eth(), params()).unwrap();

        let err = d
            .derive_deposit_address(&eth(), DepositSource::Token("satoshi"), &recipient())
            .unwrap_err();
        assert!(matches!(err, DerivationError::NotFound(_)));

        d.confirm_token(&eth(), "satoshi").unwrap();
        let derived = d
            .derive_deposit_address(&eth(), DepositSource::Token("satoshi"), &recipient())
            .unwrap();
        let DerivedAddress::Evm { address, info } = derived else {
            panic!("expected evm address");
        };
        assert_eq!(d.burner_info(&eth(), &address).unwrap(), Some(info));
    }

    #[test]
    fn test_register_token_twice() {
        let d = deriver();
        d.register_token(&eth(), params()).unwrap();
        assert!(d.register_token(&eth(), params()).is_ok());

        let mut other = params();
        other.decimals = 18;
        assert!(matches!(
            d.register_token(&eth(), other),
            Err(DerivationError::TokenExists { .. })
        ));
    }

    #[test]
    fn test_register_token_on_unknown_chain() {
        let d = deriver();
        assert!(matches!(
            d.register_token(&ChainName::new("Polygon"), params()),
            Err(DerivationError::UnsupportedChain(_))
        ));
    }

    #[test]
    fn test_bitcoin_derivation_caches_script() {
        let d = deriver();
        let pk = SigningKey::random(&mut OsRng)
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec();

        let derived = d
            .derive_deposit_address(&ChainName::bitcoin(), DepositSource::PublicKey(&pk), &recipient())
            .unwrap();
        let DerivedAddress::Bitcoin { address, script } = derived else {
            panic!("expected bitcoin address");
        };
        assert_eq!(d.deposit_script(&address).unwrap(), Some(script));

        let again = d
            .derive_deposit_address(&ChainName::bitcoin(), DepositSource::PublicKey(&pk), &recipient())
            .unwrap();
        assert_eq!(again.address_string(), address);
    }

    #[test]
    fn test_mismatched_source_rejected() {
        let d = deriver();
        assert!(matches!(
            d.derive_deposit_address(&eth(), DepositSource::PublicKey(&[2u8; 33]), &recipient()),
            Err(DerivationError::UnsupportedChain(_))
        ));
    }
}
