//! Prometheus metrics for the bridge.
//!
//! All metrics follow the naming convention: `tb_<area>_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // DEPOSITS
    // =========================================================================

    /// Deposits whose poll decided `true`
    pub static ref DEPOSITS_VERIFIED: CounterVec = CounterVec::new(
        Opts::new("tb_deposits_verified_total", "Deposits verified by poll"),
        &["chain"]
    ).expect("metric creation failed");

    /// Deposits whose poll decided `false`
    pub static ref DEPOSITS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("tb_deposits_rejected_total", "Deposits rejected by poll"),
        &["chain"]
    ).expect("metric creation failed");

    /// Votes this validator cast
    pub static ref VOTES_CAST: CounterVec = CounterVec::new(
        Opts::new("tb_votes_cast_total", "Votes cast on external-chain facts"),
        &["chain", "value"]  // value: true/false
    ).expect("metric creation failed");

    // =========================================================================
    // SIGNING
    // =========================================================================

    /// Signing rounds started
    pub static ref SIGNATURES_REQUESTED: CounterVec = CounterVec::new(
        Opts::new("tb_signatures_requested_total", "Threshold signatures requested"),
        &["chain"]
    ).expect("metric creation failed");

    /// Signed transactions assembled
    pub static ref TRANSACTIONS_ASSEMBLED: CounterVec = CounterVec::new(
        Opts::new("tb_transactions_assembled_total", "Signed transactions assembled"),
        &["chain"]
    ).expect("metric creation failed");

    // =========================================================================
    // LINKS AND TRACKING
    // =========================================================================

    /// Deposit addresses linked to recipients
    pub static ref LINKS_CREATED: CounterVec = CounterVec::new(
        Opts::new("tb_links_created_total", "Deposit addresses linked"),
        &["chain"]
    ).expect("metric creation failed");

    /// Address rescans that failed in the background
    pub static ref TRACKING_FAILURES: Counter = Counter::new(
        "tb_tracking_failures_total",
        "Background address rescans that failed"
    ).expect("metric creation failed");

    // =========================================================================
    // ERRORS
    // =========================================================================

    /// Failed messages by message type
    pub static ref HANDLER_ERRORS: CounterVec = CounterVec::new(
        Opts::new("tb_handler_errors_total", "Messages that failed"),
        &["msg"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry. Safe to call more than
/// once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(DEPOSITS_VERIFIED.clone()),
        Box::new(DEPOSITS_REJECTED.clone()),
        Box::new(VOTES_CAST.clone()),
        Box::new(SIGNATURES_REQUESTED.clone()),
        Box::new(TRANSACTIONS_ASSEMBLED.clone()),
        Box::new(LINKS_CREATED.clone()),
        Box::new(TRACKING_FAILURES.clone()),
        Box::new(HANDLER_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
