//! # Signature Normalisation
//!
//! The threshold signer produces a bare `(r, s)` pair that may have a high
//! S value and carries no recovery id. Before use on chain it is brought to
//! low-S form (BIP-62 / EIP-2) and checked against the key and hash.

use super::errors::SigningError;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use shared_types::{Hash, ThresholdSignature};

/// Parse a SEC1 public key.
pub fn parse_public_key(bytes: &[u8]) -> Result<VerifyingKey, SigningError> {
    VerifyingKey::from_sec1_bytes(bytes).map_err(|e| SigningError::InvalidPublicKey(e.to_string()))
}

/// Low-S signature from raw scalars.
pub fn normalize(signature: &ThresholdSignature) -> Result<Signature, SigningError> {
    let sig = Signature::from_scalars(signature.r, signature.s)
        .map_err(|e| SigningError::SignatureMismatch(format!("malformed scalars: {}", e)))?;
    Ok(sig.normalize_s().unwrap_or(sig))
}

/// Check a low-S signature over `hash`.
pub fn verify(key: &VerifyingKey, hash: &Hash, signature: &Signature) -> Result<(), SigningError> {
    key.verify_prehash(hash, signature)
        .map_err(|_| SigningError::SignatureMismatch("signature does not match key and hash".into()))
}

/// Recovery id under which `signature` over `hash` recovers to `key`.
pub fn recovery_id(key: &VerifyingKey, hash: &Hash, signature: &Signature) -> Result<RecoveryId, SigningError> {
    for is_y_odd in [false, true] {
        let id = RecoveryId::new(is_y_odd, false);
        if let Ok(recovered) = VerifyingKey::recover_from_prehash(hash, signature, id) {
            if recovered == *key {
                return Ok(id);
            }
        }
    }
    Err(SigningError::SignatureMismatch(
        "no recovery id yields the public key".into(),
    ))
}

/// Normalise, verify and return the signature with its recovery id.
pub fn prepare(
    public_key: &[u8],
    hash: &Hash,
    signature: &ThresholdSignature,
) -> Result<(Signature, RecoveryId), SigningError> {
    let key = parse_public_key(public_key)?;
    let sig = normalize(signature)?;
    verify(&key, hash, &sig)?;
    let id = recovery_id(&key, hash, &sig)?;
    Ok((sig, id))
}
