//! # Bitcoin Spends
//!
//! BIP-143 signing hash and witness assembly for a single P2WSH deposit
//! input. The witness is `[<DER sig ‖ SIGHASH_ALL>, <witness script>]`.

use super::entities::SpendInfo;
use super::errors::SigningError;
use bitcoin::consensus::encode;
use bitcoin::hashes::Hash as _;
use bitcoin::secp256k1::ecdsa::Signature as SecpSignature;
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{ecdsa, Amount, Script, Transaction, Witness};
use k256::ecdsa::Signature;
use shared_types::Hash;

/// Spends are limited to one deposit input so one threshold signature
/// covers the whole transaction.
pub fn require_single_input(tx: &Transaction) -> Result<(), SigningError> {
    match tx.input.len() {
        1 => Ok(()),
        n => Err(SigningError::UnsupportedTransaction(format!(
            "bitcoin spend must have exactly one input, got {}",
            n
        ))),
    }
}

/// Segwit v0 SIGHASH_ALL hash of input 0.
pub fn signing_hash(tx: &Transaction, spend: &SpendInfo) -> Result<Hash, SigningError> {
    require_single_input(tx)?;
    let script = Script::from_bytes(&spend.witness_script);
    let sighash = SighashCache::new(tx)
        .p2wsh_signature_hash(0, script, Amount::from_sat(spend.amount), EcdsaSighashType::All)
        .map_err(|e| SigningError::UnsupportedTransaction(e.to_string()))?;
    Ok(sighash.to_byte_array())
}

/// Attach a low-S signature to input 0.
pub fn assemble(tx: &Transaction, spend: &SpendInfo, signature: &Signature) -> Result<Transaction, SigningError> {
    require_single_input(tx)?;
    let secp = SecpSignature::from_compact(&signature.to_bytes())
        .map_err(|e| SigningError::SignatureMismatch(e.to_string()))?;
    let sig = ecdsa::Signature::sighash_all(secp).serialize();

    let mut signed = tx.clone();
    signed.input[0].witness = Witness::from_slice(&[sig.to_vec(), spend.witness_script.clone()]);
    Ok(signed)
}

/// Consensus encoding.
pub fn serialize(tx: &Transaction) -> Vec<u8> {
    encode::serialize(tx)
}
