//! In-memory voter
//!
//! Counts votes per poll and decides on the first value that reaches the
//! configured threshold.

use crate::ports::{Voter, VoterError};
use parking_lot::RwLock;
use shared_types::PollMeta;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
struct Tally {
    votes: HashMap<String, bool>,
    decision: Option<bool>,
}

/// Threshold voter kept in memory.
pub struct InMemoryVoter {
    threshold: usize,
    polls: RwLock<HashMap<String, Tally>>,
}

impl InMemoryVoter {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            polls: RwLock::new(HashMap::new()),
        }
    }

    /// Number of open polls.
    pub fn open_polls(&self) -> usize {
        self.polls.read().len()
    }
}

impl Voter for InMemoryVoter {
    fn init_poll(&self, poll: &PollMeta) -> Result<(), VoterError> {
        let key = poll.to_string();
        let mut polls = self.polls.write();
        if polls.contains_key(&key) {
            return Err(VoterError::PollExists(key));
        }
        debug!("[runtime] Opened poll {}", key);
        polls.insert(key, Tally::default());
        Ok(())
    }

    fn record_vote(&self, poll: &PollMeta, voter: &str, value: bool) -> Result<(), VoterError> {
        let key = poll.to_string();
        let mut polls = self.polls.write();
        let tally = polls
            .get_mut(&key)
            .ok_or_else(|| VoterError::PollNotFound(key.clone()))?;
        if tally.votes.contains_key(voter) {
            return Err(VoterError::AlreadyVoted {
                poll: key,
                voter: voter.to_string(),
            });
        }
        tally.votes.insert(voter.to_string(), value);

        if tally.decision.is_none() {
            let matching = tally.votes.values().filter(|v| **v == value).count();
            if matching >= self.threshold {
                tally.decision = Some(value);
                debug!("[runtime] Poll {} decided {}", key, value);
            }
        }
        Ok(())
    }

    fn result(&self, poll: &PollMeta) -> Result<Option<bool>, VoterError> {
        let key = poll.to_string();
        self.polls
            .read()
            .get(&key)
            .map(|t| t.decision)
            .ok_or(VoterError::PollNotFound(key))
    }

    fn delete_poll(&self, poll: &PollMeta) {
        self.polls.write().remove(&poll.to_string());
    }
}
