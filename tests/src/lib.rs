//! # Threshold Bridge Test Suite
//!
//! Flows that cross subsystem boundaries. Unit tests live next to the code
//! in each crate.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── bridge_benchmarks.rs   # derivation and signing-hash throughput
//! └── src/integration/
//!     ├── deposit_flow.rs        # ledger + verification
//!     ├── link_flow.rs           # derivation + link registry
//!     ├── signing_flow.rs        # ledger + derivation + signing pipeline
//!     └── runtime_flow.rs        # JSON messages through BridgeHandler
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tb-tests
//! cargo test -p tb-tests integration::signing_flow
//! cargo bench -p tb-tests
//! ```

#![allow(dead_code)]

pub mod integration;
