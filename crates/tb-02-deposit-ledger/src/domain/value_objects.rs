//! # Value Objects
//!
//! Storage key layout. Every deposit state owns a disjoint key range, so a
//! state change is a delete plus a put in one atomic batch.

use super::entities::{DepositId, DepositState};

/// `pending_deposit_<id>` -> Deposit (Unverified)
pub const PENDING_DEPOSIT: &str = "pending_deposit_";
/// `verified_deposit_<id>` -> Deposit
pub const VERIFIED_DEPOSIT: &str = "verified_deposit_";
/// `confirmed_deposit_<id>` -> Deposit
pub const CONFIRMED_DEPOSIT: &str = "confirmed_deposit_";
/// `burned_deposit_<id>` -> Deposit
pub const BURNED_DEPOSIT: &str = "burned_deposit_";
/// `tracked_<address>` -> marker
pub const TRACKED: &str = "tracked_";
/// `pending_token_<poll>` -> TokenDeployment
pub const PENDING_TOKEN: &str = "pending_token_";
/// `command_<hex id>` -> raw command bytes
pub const COMMAND: &str = "command_";

/// States that own a key range, in lifecycle order.
pub const STATE_PREFIXES: [(DepositState, &str); 4] = [
    (DepositState::Unverified, PENDING_DEPOSIT),
    (DepositState::Verified, VERIFIED_DEPOSIT),
    (DepositState::Confirmed, CONFIRMED_DEPOSIT),
    (DepositState::Burned, BURNED_DEPOSIT),
];

/// Key prefix of a stored state. Rejected deposits are deleted.
pub fn state_prefix(state: DepositState) -> Option<&'static str> {
    match state {
        DepositState::Rejected => None,
        state => STATE_PREFIXES
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, prefix)| *prefix),
    }
}

/// Join a prefix and an id.
pub fn key(prefix: &str, id: &str) -> Vec<u8> {
    let mut k = Vec::with_capacity(prefix.len() + id.len());
    k.extend_from_slice(prefix.as_bytes());
    k.extend_from_slice(id.as_bytes());
    k
}

/// Key of a deposit in a stored state.
pub fn deposit_key(prefix: &str, id: &DepositId) -> Vec<u8> {
    key(prefix, id.as_str())
}
