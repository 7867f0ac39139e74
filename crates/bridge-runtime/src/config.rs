//! # Bridge Configuration
//!
//! Runtime parameters loaded from TOML with environment overrides.
//!
//! ```toml
//! [bitcoin]
//! network = "regtest"
//! confirmations = 1
//!
//! [[evm]]
//! name = "Ethereum"
//! chain_id = 1
//! confirmations = 12
//! token_bytecode = "6080..."
//! burner_bytecode = "6080..."
//! gateway_address = "0x..."
//!
//! [storage]
//! backend = "memory"
//! data_dir = "./data/bridge"
//!
//! [voting]
//! threshold = 1
//! validator = "validator-0"
//!
//! [tracking]
//! queue_depth = 64
//! ```
//!
//! ## Environment Overrides
//!
//! - `TB_DATA_DIR` - storage directory
//! - `TB_BITCOIN_NETWORK` - bitcoin network name
//! - `TB_VOTE_THRESHOLD` - matching votes needed to decide a poll

use crate::chain::ChainAdapter;
use bitcoin::Network;
use serde::{Deserialize, Serialize};
use shared_types::{Address, ChainName};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tb_01_address_derivation::{parse_evm_address, DerivationConfig, EvmBytecodes};
use tb_04_signing_pipeline::{PipelineConfig, MAX_CHAIN_ID};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: PathBuf, error: std::io::Error },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub bitcoin: BitcoinSection,
    pub evm: Vec<EvmChainSection>,
    pub storage: StorageSection,
    pub voting: VotingSection,
    pub tracking: TrackingSection,
}

/// `[bitcoin]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitcoinSection {
    /// `bitcoin`, `testnet`, `signet` or `regtest`.
    pub network: String,
    /// Minimum confirmations a deposit claim is checked against.
    pub confirmations: u64,
}

impl Default for BitcoinSection {
    fn default() -> Self {
        Self {
            network: "regtest".to_string(),
            confirmations: 1,
        }
    }
}

/// One `[[evm]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmChainSection {
    pub name: String,
    pub chain_id: u64,
    #[serde(default = "default_evm_confirmations")]
    pub confirmations: u64,
    /// Hex creation code of the token contract.
    #[serde(default)]
    pub token_bytecode: String,
    /// Hex creation code of the burner contract.
    #[serde(default)]
    pub burner_bytecode: String,
    /// Gateway contract, once deployed.
    #[serde(default)]
    pub gateway_address: Option<String>,
}

fn default_evm_confirmations() -> u64 {
    12
}

/// Storage backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    RocksDb,
}

/// `[storage]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data/bridge"),
        }
    }
}

/// `[voting]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingSection {
    /// Matching votes needed to decide a poll.
    pub threshold: usize,
    /// Name this validator votes under.
    pub validator: String,
}

impl Default for VotingSection {
    fn default() -> Self {
        Self {
            threshold: 1,
            validator: "validator-0".to_string(),
        }
    }
}

/// `[tracking]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSection {
    /// Rescan requests buffered before new ones are dropped.
    pub queue_depth: usize,
}

impl Default for TrackingSection {
    fn default() -> Self {
        Self { queue_depth: 64 }
    }
}

impl BridgeConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::parse(&contents)
    }

    /// Parse TOML and validate.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TB_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `TB_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("TB_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(network) = lookup("TB_BITCOIN_NETWORK") {
            self.bitcoin.network = network;
        }
        if let Some(threshold) = lookup("TB_VOTE_THRESHOLD") {
            self.voting.threshold = threshold
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("TB_VOTE_THRESHOLD {:?}", threshold)))?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject configurations the runtime cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bitcoin_network()?;
        if self.voting.threshold == 0 {
            return Err(ConfigError::Invalid("voting threshold must be at least 1".into()));
        }
        if self.tracking.queue_depth == 0 {
            return Err(ConfigError::Invalid("tracking queue depth must be at least 1".into()));
        }
        for (i, evm) in self.evm.iter().enumerate() {
            if evm.name.eq_ignore_ascii_case("bitcoin") {
                return Err(ConfigError::Invalid("bitcoin cannot be an EVM chain".into()));
            }
            if self.evm[..i].iter().any(|e| e.name.eq_ignore_ascii_case(&evm.name)) {
                return Err(ConfigError::Invalid(format!("duplicate EVM chain {}", evm.name)));
            }
            if evm.chain_id == 0 || evm.chain_id > MAX_CHAIN_ID {
                return Err(ConfigError::Invalid(format!(
                    "{} chain_id must be between 1 and {}",
                    evm.name, MAX_CHAIN_ID
                )));
            }
            decode_hex(&evm.name, "token_bytecode", &evm.token_bytecode)?;
            decode_hex(&evm.name, "burner_bytecode", &evm.burner_bytecode)?;
            evm.gateway()?;
        }
        Ok(())
    }

    /// Parsed bitcoin network.
    pub fn bitcoin_network(&self) -> Result<Network, ConfigError> {
        Network::from_str(self.bitcoin.network.trim())
            .map_err(|e| ConfigError::Invalid(format!("bitcoin network {:?}: {}", self.bitcoin.network, e)))
    }

    /// Address derivation parameters.
    pub fn derivation_config(&self) -> Result<DerivationConfig, ConfigError> {
        let mut config = DerivationConfig {
            bitcoin_network: self.bitcoin_network()?,
            ..DerivationConfig::default()
        };
        for evm in &self.evm {
            let bytecodes = EvmBytecodes {
                token: decode_hex(&evm.name, "token_bytecode", &evm.token_bytecode)?,
                burner: decode_hex(&evm.name, "burner_bytecode", &evm.burner_bytecode)?,
            };
            config = config.with_evm_chain(ChainName::new(evm.name.clone()), bytecodes);
        }
        Ok(config)
    }

    /// Signing pipeline parameters.
    pub fn pipeline_config(&self) -> PipelineConfig {
        self.evm.iter().fold(PipelineConfig::default(), |config, evm| {
            config.with_evm_chain(ChainName::new(evm.name.clone()), evm.chain_id)
        })
    }

    /// Adapter for `chain`, matched case-insensitively. Returns the chain
    /// name in its configured spelling.
    pub fn chain_adapter(&self, chain: &ChainName) -> Option<(ChainName, ChainAdapter)> {
        if chain.is_bitcoin() {
            let network = self.bitcoin_network().ok()?;
            return Some((
                ChainName::bitcoin(),
                ChainAdapter::Bitcoin {
                    network,
                    confirmations: self.bitcoin.confirmations,
                },
            ));
        }
        self.evm
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(chain.as_str()))
            .map(|e| {
                (
                    ChainName::new(e.name.clone()),
                    ChainAdapter::Evm {
                        chain_id: e.chain_id,
                        confirmations: e.confirmations,
                    },
                )
            })
    }
}

impl EvmChainSection {
    /// Parsed gateway address.
    pub fn gateway(&self) -> Result<Option<Address>, ConfigError> {
        self.gateway_address
            .as_deref()
            .map(|s| {
                parse_evm_address(s)
                    .map_err(|e| ConfigError::Invalid(format!("{} gateway_address: {}", self.name, e)))
            })
            .transpose()
    }
}

fn decode_hex(chain: &str, field: &str, value: &str) -> Result<Vec<u8>, ConfigError> {
    let trimmed = value.trim();
    hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .map_err(|e| ConfigError::Invalid(format!("{} {}: {}", chain, field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
[bitcoin]
network = "testnet"
confirmations = 3

[[evm]]
name = "Ethereum"
chain_id = 1
token_bytecode = "0x6080"
burner_bytecode = "6081"
gateway_address = "0x1111111111111111111111111111111111111111"

[voting]
threshold = 2
"#;

    #[test]
    fn test_defaults_are_valid() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bitcoin_network().unwrap(), Network::Regtest);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_parse_sample() {
        let config = BridgeConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.bitcoin_network().unwrap(), Network::Testnet);
        assert_eq!(config.evm.len(), 1);
        assert_eq!(config.evm[0].confirmations, 12);
        assert_eq!(config.voting.threshold, 2);
        assert_eq!(config.voting.validator, "validator-0");
        assert_eq!(config.tracking.queue_depth, 64);

        let derivation = config.derivation_config().unwrap();
        let bytecodes = &derivation.evm_chains[&ChainName::new("Ethereum")];
        assert_eq!(bytecodes.token, vec![0x60, 0x80]);
        assert_eq!(bytecodes.burner, vec![0x60, 0x81]);
        assert_eq!(config.evm[0].gateway().unwrap(), Some([0x11; 20]));
    }

    #[test]
    fn test_bad_bytecode_rejected() {
        let toml = SAMPLE.replace("\"6081\"", "\"zz\"");
        assert!(matches!(BridgeConfig::parse(&toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_chain_id_out_of_range_rejected() {
        for id in [0, MAX_CHAIN_ID + 1] {
            let toml = SAMPLE.replace("chain_id = 1", &format!("chain_id = {}", id));
            assert!(
                matches!(BridgeConfig::parse(&toml), Err(ConfigError::Invalid(_))),
                "chain_id {}",
                id
            );
        }
        let toml = SAMPLE.replace("chain_id = 1", &format!("chain_id = {}", MAX_CHAIN_ID));
        assert!(BridgeConfig::parse(&toml).is_ok());
    }

    #[test]
    fn test_unknown_network_rejected() {
        let toml = SAMPLE.replace("testnet", "moonnet");
        assert!(matches!(BridgeConfig::parse(&toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TB_DATA_DIR", "/tmp/tb"),
            ("TB_BITCOIN_NETWORK", "signet"),
            ("TB_VOTE_THRESHOLD", "5"),
        ]
        .into_iter()
        .collect();
        let config = BridgeConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/tb"));
        assert_eq!(config.bitcoin_network().unwrap(), Network::Signet);
        assert_eq!(config.voting.threshold, 5);
    }

    #[test]
    fn test_zero_threshold_override_rejected() {
        let result = BridgeConfig::default().with_overrides(|k| {
            (k == "TB_VOTE_THRESHOLD").then(|| "0".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_chain_adapter_lookup_is_case_insensitive() {
        let config = BridgeConfig::parse(SAMPLE).unwrap();
        let (name, adapter) = config.chain_adapter(&ChainName::new("ETHEREUM")).unwrap();
        assert_eq!(name, ChainName::new("Ethereum"));
        assert_eq!(adapter.min_confirmations(), 12);
        assert!(config.chain_adapter(&ChainName::new("Polygon")).is_none());
        assert!(config.chain_adapter(&ChainName::new("bitcoin")).unwrap().1.is_bitcoin());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        assert!(matches!(
            BridgeConfig::load("/nonexistent/bridge.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
