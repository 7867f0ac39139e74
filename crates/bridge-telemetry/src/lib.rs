//! # Bridge Telemetry
//!
//! Structured logging and Prometheus metrics for the threshold bridge.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TB_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `TB_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `TB_SERVICE_NAME` | `threshold-bridge` | Service name |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};
pub use metrics::{
    encode_metrics, register_metrics, DEPOSITS_REJECTED, DEPOSITS_VERIFIED, HANDLER_ERRORS,
    LINKS_CREATED, SIGNATURES_REQUESTED, TRACKING_FAILURES, TRANSACTIONS_ASSEMBLED, VOTES_CAST,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}
