//! # Bitcoin Deposit Scripts
//!
//! A deposit address is the P2WSH address of a witness script that commits
//! to the recipient and is spendable by the threshold key:
//!
//! ```text
//! <sha256(chain ‖ 0x00 ‖ address)> OP_DROP <pubkey> OP_CHECKSIG
//! ```
//!
//! Without a recipient the script is the bare `<pubkey> OP_CHECKSIG`
//! (the consolidation address of the key).

use super::errors::DerivationError;
use bitcoin::opcodes::all::{OP_CHECKSIG, OP_DROP};
use bitcoin::{Address, Network, PublicKey, ScriptBuf};
use sha2::{Digest, Sha256};
use shared_types::{CrossChainAddress, Hash};

/// SHA-256 commitment to a recipient.
pub fn recipient_commitment(recipient: &CrossChainAddress) -> Hash {
    Sha256::digest(recipient.to_canonical_bytes()).into()
}

/// Witness script locking funds to `public_key`, scoped to `recipient`.
pub fn deposit_script(
    public_key: &[u8],
    recipient: Option<&CrossChainAddress>,
) -> Result<ScriptBuf, DerivationError> {
    let key = PublicKey::from_slice(public_key)
        .map_err(|e| DerivationError::InvalidPublicKey(e.to_string()))?;

    let mut builder = ScriptBuf::builder();
    if let Some(recipient) = recipient {
        builder = builder
            .push_slice(recipient_commitment(recipient))
            .push_opcode(OP_DROP);
    }
    Ok(builder.push_key(&key).push_opcode(OP_CHECKSIG).into_script())
}

/// P2WSH address of `script` on `network`.
pub fn deposit_address(script: &ScriptBuf, network: Network) -> Address {
    Address::p2wsh(script, network)
}
