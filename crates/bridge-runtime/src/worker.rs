//! # Rescan Worker
//!
//! Importing an address into the bitcoin node can take minutes when a
//! rescan is requested, so it runs on its own task. The handler hands off a
//! request and moves on; failures are logged, counted and reported on the
//! error channel.
//!
//! ```text
//! BridgeHandler ──try_send──→ [bounded queue] ──→ worker ──→ ChainDataClient
//!                                                   │
//!                                                   └── TrackingFailure ──→ error channel
//! ```

use bridge_telemetry::metrics::TRACKING_FAILURES;
use std::sync::Arc;
use tb_03_verification::ChainDataClient;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// One address to import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RescanRequest {
    pub address: String,
    pub label: String,
    pub rescan: bool,
}

/// A failed import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackingFailure {
    pub address: String,
    pub error: String,
}

/// Sending half of the rescan queue.
#[derive(Clone, Debug)]
pub struct RescanHandle {
    tx: mpsc::Sender<RescanRequest>,
}

impl RescanHandle {
    /// Queue `request` without waiting. Returns `false` if it was dropped.
    pub fn request(&self, request: RescanRequest) -> bool {
        match self.tx.try_send(request) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(req)) => {
                warn!("[runtime] Rescan queue full, dropped {}", req.address);
                TRACKING_FAILURES.inc();
                false
            }
            Err(mpsc::error::TrySendError::Closed(req)) => {
                warn!("[runtime] Rescan worker stopped, dropped {}", req.address);
                TRACKING_FAILURES.inc();
                false
            }
        }
    }
}

/// Spawn the worker. It stops once every [`RescanHandle`] is dropped.
pub fn spawn_rescan_worker(
    client: Arc<dyn ChainDataClient>,
    queue_depth: usize,
) -> (RescanHandle, mpsc::Receiver<TrackingFailure>, JoinHandle<()>) {
    let depth = queue_depth.max(1);
    let (tx, mut rx) = mpsc::channel::<RescanRequest>(depth);
    let (err_tx, err_rx) = mpsc::channel::<TrackingFailure>(depth);

    let task = tokio::spawn(async move {
        while let Some(req) = rx.recv().await {
            match client
                .import_address_rescan(&req.address, &req.label, req.rescan)
                .await
            {
                Ok(()) => info!("[runtime] Imported {} (rescan={})", req.address, req.rescan),
                Err(e) => {
                    error!("[runtime] Failed to import {}: {}", req.address, e);
                    TRACKING_FAILURES.inc();
                    let failure = TrackingFailure {
                        address: req.address,
                        error: e.to_string(),
                    };
                    // Nobody listening is fine; the failure is already logged.
                    let _ = err_tx.try_send(failure);
                }
            }
        }
        info!("[runtime] Rescan worker stopped");
    });

    (RescanHandle { tx }, err_rx, task)
}
