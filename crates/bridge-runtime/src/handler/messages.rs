//! Messages accepted by the bridge and their results.

use serde::{Deserialize, Serialize};
use shared_types::{ChainName, CrossChainAddress, KeyId, PollMeta, ThresholdSignature};
use tb_01_address_derivation::TokenDeployParams;
use tb_02_deposit_ledger::Deposit;
use tb_04_signing_pipeline::UnsignedTx;

/// Poll type of deposit verification polls.
pub const DEPOSIT_POLL: &str = "deposit";
/// Poll type of token deployment polls.
pub const TOKEN_DEPLOY_POLL: &str = "token_deploy";

/// What a `Track` message watches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackTarget {
    /// An explicit bitcoin address.
    Address(String),
    /// The plain deposit address of a key.
    Key(KeyId),
    /// The plain deposit address of the current master key.
    CurrentKey,
}

/// One bridge message. Messages are processed one at a time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeMsg {
    /// Derive a deposit address for `recipient` and link it.
    Link {
        chain: ChainName,
        /// Token to deposit. Required on EVM chains.
        #[serde(default)]
        symbol: Option<String>,
        recipient: CrossChainAddress,
    },
    /// Watch a bitcoin address.
    Track {
        target: TrackTarget,
        #[serde(default)]
        rescan: bool,
    },
    /// Open a poll on a claimed deposit and cast this validator's vote.
    VerifyDeposit { chain: ChainName, deposit: Deposit },
    /// Open a poll on a claimed token deployment and cast this validator's vote.
    VerifyTokenDeploy {
        chain: ChainName,
        /// Deployment transaction hash, hex.
        tx_id: String,
        symbol: String,
    },
    /// Another validator's vote.
    Vote {
        poll: PollMeta,
        voter: String,
        value: bool,
    },
    /// Register token parameters ahead of deployment.
    SignDeployToken {
        chain: ChainName,
        params: TokenDeployParams,
    },
    /// Store an outgoing transaction and start signing it.
    SignTx {
        chain: ChainName,
        id: String,
        tx: UnsignedTx,
    },
    /// Attach the finished signature and optionally broadcast.
    AssembleTx {
        chain: ChainName,
        id: String,
        signature: ThresholdSignature,
        #[serde(default)]
        broadcast: bool,
    },
    /// List transfers queued for `chain`.
    PendingTransfers { chain: ChainName },
    /// Mark a queued transfer as executed.
    ArchiveTransfer { chain: ChainName, id: u64 },
}

impl BridgeMsg {
    /// Message type, as used in metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            BridgeMsg::Link { .. } => "link",
            BridgeMsg::Track { .. } => "track",
            BridgeMsg::VerifyDeposit { .. } => "verify_deposit",
            BridgeMsg::VerifyTokenDeploy { .. } => "verify_token_deploy",
            BridgeMsg::Vote { .. } => "vote",
            BridgeMsg::SignDeployToken { .. } => "sign_deploy_token",
            BridgeMsg::SignTx { .. } => "sign_tx",
            BridgeMsg::AssembleTx { .. } => "assemble_tx",
            BridgeMsg::PendingTransfers { .. } => "pending_transfers",
            BridgeMsg::ArchiveTransfer { .. } => "archive_transfer",
        }
    }
}

/// Outcome of a message: payload bytes plus a human-readable log line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MsgResult {
    pub data: Vec<u8>,
    pub log: String,
}

impl MsgResult {
    pub fn new(data: impl Into<Vec<u8>>, log: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            log: log.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_message_from_json() {
        let json = r#"{
            "type": "link",
            "chain": "Bitcoin",
            "recipient": {"chain": "Axelar", "address": "R1"}
        }"#;
        let msg: BridgeMsg = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            BridgeMsg::Link {
                chain: ChainName::bitcoin(),
                symbol: None,
                recipient: CrossChainAddress::new("Axelar", "R1"),
            }
        );
        assert_eq!(msg.name(), "link");
    }

    #[test]
    fn test_track_targets_from_json() {
        let msg: BridgeMsg =
            serde_json::from_str(r#"{"type": "track", "target": "current_key", "rescan": true}"#).unwrap();
        assert_eq!(
            msg,
            BridgeMsg::Track {
                target: TrackTarget::CurrentKey,
                rescan: true
            }
        );

        let msg: BridgeMsg =
            serde_json::from_str(r#"{"type": "track", "target": {"key": "master-1"}}"#).unwrap();
        assert_eq!(
            msg,
            BridgeMsg::Track {
                target: TrackTarget::Key(KeyId::new("master-1")),
                rescan: false
            }
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_json::from_str::<BridgeMsg>(r#"{"type": "mint"}"#).is_err());
    }
}
