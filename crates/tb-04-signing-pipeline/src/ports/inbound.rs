//! # Inbound Port
//!
//! Pipeline operations offered to the message handler.

use crate::domain::{PipelineRecord, SignedTransaction, SigningError, UnsignedTx};
use shared_types::{ChainName, Hash, KeyId, ThresholdSignature, Validator};

/// Signing pipeline API.
pub trait SigningPipelineApi {
    /// Store the unsigned transaction for `id`.
    ///
    /// Every input must spend a Verified or Confirmed deposit. Content may
    /// be replaced until a signature is requested.
    fn set_unsigned_tx(&self, chain: &ChainName, id: &str, tx: UnsignedTx) -> Result<(), SigningError>;

    /// Compute (or return the already computed) signing hash.
    fn compute_signing_hash(&self, chain: &ChainName, id: &str) -> Result<Hash, SigningError>;

    /// Hand the signing hash to the threshold signer. Non-blocking; at most
    /// one request per transaction.
    fn request_signature(
        &self,
        chain: &ChainName,
        id: &str,
        key_id: &KeyId,
        hash: &Hash,
        signers: &[Validator],
    ) -> Result<(), SigningError>;

    /// Attach a threshold signature and produce the signed transaction.
    fn assemble_signed(
        &self,
        chain: &ChainName,
        id: &str,
        public_key: &[u8],
        signature: &ThresholdSignature,
    ) -> Result<SignedTransaction, SigningError>;

    /// Pipeline record of `id`.
    fn record(&self, chain: &ChainName, id: &str) -> Result<Option<PipelineRecord>, SigningError>;

    /// Signed transaction of `id`, once assembled.
    fn signed_tx(&self, chain: &ChainName, id: &str) -> Result<Option<SignedTransaction>, SigningError>;
}
