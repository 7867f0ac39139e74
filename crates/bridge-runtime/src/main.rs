//! # Threshold Bridge Node
//!
//! Reads one JSON-encoded `BridgeMsg` per line from stdin and writes one
//! JSON result per line to stdout.
//!
//! ```text
//! $ bridge-runtime bridge.toml
//! {"type": "track", "target": "current_key", "rescan": true}
//! {"ok":true,"data":"6263727431...","log":"tracking bcrt1...; import queued"}
//! ```
//!
//! Chain access uses the in-memory client; a node RPC client plugs in
//! through `ChainDataClient`.

use anyhow::{Context, Result};
use bridge_runtime::{
    spawn_rescan_worker, BridgeConfig, BridgeHandler, BridgeMsg, InMemoryVoter, StorageBackend,
};
use bridge_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use serde_json::json;
use shared_types::{ChainName, InMemoryKVStore, KeyId, KeyValueStore, Snapshot, ThresholdKey};
use std::sync::Arc;
use tb_03_verification::{ChainDataClient, MockChainDataClient};
use tb_04_signing_pipeline::InMemorySigner;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

fn load_config() -> Result<BridgeConfig> {
    let config = match std::env::args().nth(1).or_else(|| std::env::var("TB_CONFIG").ok()) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            BridgeConfig::load(&path).with_context(|| format!("loading {}", path))?
        }
        None => {
            info!("No configuration file given, using defaults");
            BridgeConfig::default()
        }
    };
    config.with_env_overrides().context("applying environment overrides")
}

fn open_store(config: &BridgeConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; state is lost on exit");
            Ok(Arc::new(InMemoryKVStore::new()))
        }
        #[cfg(feature = "rocksdb")]
        StorageBackend::RocksDb => {
            use bridge_runtime::adapters::storage::{RocksDbConfig, RocksDbStore};
            let store = RocksDbStore::open(RocksDbConfig {
                path: config.storage.data_dir.clone(),
                ..RocksDbConfig::default()
            })?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "rocksdb"))]
        StorageBackend::RocksDb => {
            anyhow::bail!("storage backend rocksdb requires the `rocksdb` feature")
        }
    }
}

/// Register the master key given as compressed hex in `TB_MASTER_PUBKEY`
/// for every configured chain.
fn master_signer(config: &BridgeConfig) -> Result<InMemorySigner> {
    let signer = InMemorySigner::new();
    let Ok(pubkey) = std::env::var("TB_MASTER_PUBKEY") else {
        warn!("TB_MASTER_PUBKEY not set; linking and signing will fail");
        return Ok(signer);
    };
    let key = ThresholdKey {
        id: KeyId::new("master"),
        public_key: hex::decode(pubkey.trim()).context("TB_MASTER_PUBKEY is not hex")?,
    };
    signer.add_key(
        key.clone(),
        Snapshot {
            round: 0,
            validators: Vec::new(),
        },
    );
    signer.set_current_key(ChainName::bitcoin(), key.id.clone());
    for evm in &config.evm {
        signer.set_current_key(ChainName::new(evm.name.clone()), key.id.clone());
    }
    Ok(signer)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env())?;
    info!("Starting threshold bridge v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let store = open_store(&config)?;
    let signer = Arc::new(master_signer(&config)?);
    let voter = Arc::new(InMemoryVoter::new(config.voting.threshold));

    let network = config.bitcoin_network()?.to_string();
    let btc_client: Arc<dyn ChainDataClient> = Arc::new(MockChainDataClient::new(network));
    let (rescan, mut failures, worker) =
        spawn_rescan_worker(Arc::clone(&btc_client), config.tracking.queue_depth);
    tokio::spawn(async move {
        while let Some(failure) = failures.recv().await {
            error!("Tracking {} failed: {}", failure.address, failure.error);
        }
    });

    let evm_chains: Vec<ChainName> = config.evm.iter().map(|e| ChainName::new(e.name.clone())).collect();
    let mut handler = BridgeHandler::new(config, store, signer, voter)?
        .with_chain_client(&ChainName::bitcoin(), btc_client)
        .with_rescan_worker(rescan);
    for chain in &evm_chains {
        handler = handler.with_chain_client(chain, Arc::new(MockChainDataClient::new(chain.namespace())));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    info!("Ready, reading messages from stdin");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                None
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<BridgeMsg>(&line) {
            Ok(msg) => match handler.handle(msg).await {
                Ok(result) => json!({"ok": true, "data": hex::encode(&result.data), "log": result.log}),
                Err(e) => json!({"ok": false, "error": e.to_string()}),
            },
            Err(e) => json!({"ok": false, "error": format!("invalid message: {}", e)}),
        };
        stdout.write_all(format!("{}\n", reply).as_bytes()).await?;
        stdout.flush().await?;
    }

    drop(handler);
    worker.await.context("rescan worker panicked")?;
    info!("Final metrics:\n{}", encode_metrics().unwrap_or_default());
    Ok(())
}
