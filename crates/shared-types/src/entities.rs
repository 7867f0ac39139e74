//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Chains**: `ChainName`, `CrossChainAddress`
//! - **Voting**: `PollMeta`
//! - **Threshold signing**: `KeyId`, `ThresholdKey`, `ThresholdSignature`,
//!   `Validator`, `Snapshot`

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte hash (Keccak-256, SHA-256 or a Bitcoin sighash).
pub type Hash = [u8; 32];

/// A 20-byte EVM address.
pub type Address = [u8; 20];

// =============================================================================
// CLUSTER A: CHAINS
// =============================================================================

/// Name of a chain, external or internal.
///
/// Comparison is exact; the storage namespace is the lower-cased name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainName(String);

impl ChainName {
    /// Create a chain name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The Bitcoin chain.
    pub fn bitcoin() -> Self {
        Self::new("Bitcoin")
    }

    /// The internal chain that deposits are routed into.
    pub fn axelar() -> Self {
        Self::new("Axelar")
    }

    /// Raw name as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage namespace for this chain: the lower-cased name.
    pub fn namespace(&self) -> String {
        self.0.to_lowercase()
    }

    /// True for the Bitcoin chain, regardless of case.
    pub fn is_bitcoin(&self) -> bool {
        self.0.eq_ignore_ascii_case("bitcoin")
    }
}

impl fmt::Display for ChainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// An address qualified by the chain it lives on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossChainAddress {
    /// Chain the address belongs to.
    pub chain: ChainName,
    /// Chain-native encoding of the address.
    pub address: String,
}

impl CrossChainAddress {
    /// Create a cross-chain address.
    pub fn new(chain: impl Into<ChainName>, address: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            address: address.into(),
        }
    }

    /// Canonical byte encoding: `chain ‖ 0x00 ‖ address`.
    ///
    /// Used wherever a recipient is hashed, so it must never change.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.chain.as_str().len() + 1 + self.address.len());
        out.extend_from_slice(self.chain.as_str().as_bytes());
        out.push(0);
        out.extend_from_slice(self.address.as_bytes());
        out
    }
}

impl fmt::Display for CrossChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.address)
    }
}

// =============================================================================
// CLUSTER B: VOTING
// =============================================================================

/// Identifies one poll: a vote on the truth of one external-chain fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PollMeta {
    /// Module that opened the poll.
    pub module: String,
    /// Kind of fact being voted on.
    pub poll_type: String,
    /// Identifier of the fact.
    pub id: String,
}

impl PollMeta {
    /// Create poll metadata.
    pub fn new(
        module: impl Into<String>,
        poll_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            poll_type: poll_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for PollMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.module, self.poll_type, self.id)
    }
}

// =============================================================================
// CLUSTER C: THRESHOLD SIGNING
// =============================================================================

/// Identifier of a threshold key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyId(pub String);

impl KeyId {
    /// Create a key id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A threshold public key as the signing subsystem publishes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdKey {
    /// Key identifier.
    pub id: KeyId,
    /// SEC1-encoded secp256k1 public key (compressed or uncompressed).
    pub public_key: Vec<u8>,
}

/// Generic secp256k1 signature as produced by the threshold signer.
///
/// Carries no recovery id and may have a high S value; chain-specific
/// assembly normalizes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSignature {
    /// R scalar, big-endian.
    pub r: [u8; 32],
    /// S scalar, big-endian.
    pub s: [u8; 32],
}

/// A validator allowed to take part in a signing round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Operator address on the internal chain.
    pub address: String,
    /// Voting power.
    pub power: u64,
}

/// The validator set a key was generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot round.
    pub round: u64,
    /// Participating validators.
    pub validators: Vec<Validator>,
}

/// Lower-case hex without prefix.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
