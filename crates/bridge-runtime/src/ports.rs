//! # Ports
//!
//! Outbound dependencies of the message handler that no subsystem owns.

use shared_types::PollMeta;
use thiserror::Error;

/// Voting module errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoterError {
    #[error("Poll already exists: {0}")]
    PollExists(String),

    #[error("Poll not found: {0}")]
    PollNotFound(String),

    #[error("{voter} already voted in {poll}")]
    AlreadyVoted { poll: String, voter: String },
}

/// Validator voting.
///
/// A poll is decided once enough validators agree on one value. The
/// decision is reported by [`Voter::result`] until the poll is deleted.
pub trait Voter: Send + Sync {
    /// Open a poll. Fails if it is already open.
    fn init_poll(&self, poll: &PollMeta) -> Result<(), VoterError>;

    /// Record one validator's vote.
    fn record_vote(&self, poll: &PollMeta, voter: &str, value: bool) -> Result<(), VoterError>;

    /// `Some(value)` once decided.
    fn result(&self, poll: &PollMeta) -> Result<Option<bool>, VoterError>;

    /// Close a poll. Unknown polls are ignored.
    fn delete_poll(&self, poll: &PollMeta);
}
