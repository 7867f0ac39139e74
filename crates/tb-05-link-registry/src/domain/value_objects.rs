//! # Value Objects
//!
//! Storage key layout.
//!
//! | Key | Namespace | Value |
//! |-----|-----------|-------|
//! | `link_<address>` | deposit chain | recipient |
//! | `linked_<recipient address>/<deposit chain>:<address>` | recipient chain | deposit address |
//! | `transfer_<id, 20 digits>` | recipient chain | `CrossChainTransfer` |
//! | `next_transfer_id` | recipient chain | `u64` |

use shared_types::CrossChainAddress;

pub const LINK: &str = "link_";
pub const LINKED: &str = "linked_";
pub const TRANSFER: &str = "transfer_";
pub const NEXT_TRANSFER_ID: &[u8] = b"next_transfer_id";

/// Forward binding key of a deposit address.
pub fn link_key(deposit: &CrossChainAddress) -> Vec<u8> {
    format!("{}{}", LINK, deposit.address).into_bytes()
}

/// Prefix of every reverse binding of `recipient`.
pub fn linked_prefix(recipient: &CrossChainAddress) -> Vec<u8> {
    format!("{}{}/", LINKED, recipient.address).into_bytes()
}

/// Reverse binding key.
pub fn linked_key(recipient: &CrossChainAddress, deposit: &CrossChainAddress) -> Vec<u8> {
    let mut k = linked_prefix(recipient);
    k.extend_from_slice(deposit.to_string().as_bytes());
    k
}

/// Zero-padded so key order is id order.
pub fn transfer_key(id: u64) -> Vec<u8> {
    format!("{}{:020}", TRANSFER, id).into_bytes()
}
