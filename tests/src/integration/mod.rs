//! Cross-subsystem flows.

pub mod deposit_flow;
pub mod link_flow;
pub mod runtime_flow;
pub mod signing_flow;
