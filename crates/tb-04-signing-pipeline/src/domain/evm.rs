//! # EVM Legacy Transactions
//!
//! EIP-155 signing hash and signed encoding.
//!
//! ```text
//! hash   = keccak256(rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]))
//! signed = rlp([nonce, gasPrice, gasLimit, to, value, data, v, r, s])
//! v      = recovery_id + chainId * 2 + 35
//! ```

use super::entities::EvmTransaction;
use rlp::RlpStream;
use sha3::{Digest, Keccak256};
use shared_types::{Hash, U256};

impl EvmTransaction {
    fn append_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas_limit);
        match &self.to {
            Some(to) => stream.append(&to.to_vec()),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value);
        stream.append(&self.data);
    }

    /// EIP-155 signing hash for `chain_id`.
    pub fn signing_hash(&self, chain_id: u64) -> Hash {
        let mut stream = RlpStream::new_list(9);
        self.append_fields(&mut stream);
        stream.append(&chain_id);
        stream.append(&0u8);
        stream.append(&0u8);

        let mut hasher = Keccak256::new();
        hasher.update(stream.as_raw());
        hasher.finalize().into()
    }

    /// Signed RLP encoding.
    pub fn encode_signed(&self, v: u64, r: &[u8; 32], s: &[u8; 32]) -> Vec<u8> {
        let mut stream = RlpStream::new_list(9);
        self.append_fields(&mut stream);
        stream.append(&v);
        stream.append(&U256::from_big_endian(r));
        stream.append(&U256::from_big_endian(s));
        stream.out().to_vec()
    }
}

/// Largest chain id whose EIP-155 `v` fits in a `u64` for any recovery id.
pub const MAX_CHAIN_ID: u64 = (u64::MAX - 38) / 2;

/// EIP-155 `v` for a recovery id, `None` on overflow.
pub fn eip155_v(recovery_id: u8, chain_id: u64) -> Option<u64> {
    chain_id
        .checked_mul(2)?
        .checked_add(35)?
        .checked_add(u64::from(recovery_id))
}

/// Keccak-256 hash of a signed transaction, which is its transaction hash.
pub fn tx_hash(raw: &[u8]) -> Hash {
    Keccak256::digest(raw).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The worked example from EIP-155.
    fn eip155_example() -> EvmTransaction {
        EvmTransaction {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21_000,
            to: Some([0x35; 20]),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: Vec::new(),
            deposits: Vec::new(),
        }
    }

    #[test]
    fn test_eip155_signing_hash_vector() {
        let hash = eip155_example().signing_hash(1);
        assert_eq!(
            hex::encode(hash),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn test_chain_id_changes_hash() {
        let tx = eip155_example();
        assert_ne!(tx.signing_hash(1), tx.signing_hash(3));
    }

    #[test]
    fn test_v_values() {
        assert_eq!(eip155_v(0, 1), Some(37));
        assert_eq!(eip155_v(1, 1), Some(38));
    }

    #[test]
    fn test_v_overflow_is_none() {
        assert_eq!(eip155_v(0, u64::MAX), None);
        assert_eq!(eip155_v(3, MAX_CHAIN_ID + 1), None);
        assert!(eip155_v(3, MAX_CHAIN_ID).is_some());
    }

    #[test]
    fn test_contract_creation_encodes_empty_to() {
        let mut tx = eip155_example();
        tx.to = None;
        let signed = tx.encode_signed(37, &[1; 32], &[2; 32]);
        let rlp = rlp::Rlp::new(&signed);
        assert_eq!(rlp.item_count().unwrap(), 9);
        assert!(rlp.at(3).unwrap().data().unwrap().is_empty());
    }
}
