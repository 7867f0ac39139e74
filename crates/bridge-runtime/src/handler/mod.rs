//! # Message Handler
//!
//! Decodes nothing itself: messages arrive as [`BridgeMsg`] values and
//! leave as [`MsgResult`] or [`HandlerError`].

mod bridge_handler;
mod errors;
mod messages;

pub use bridge_handler::BridgeHandler;
pub use errors::HandlerError;
pub use messages::{BridgeMsg, MsgResult, TrackTarget, DEPOSIT_POLL, TOKEN_DEPLOY_POLL};
