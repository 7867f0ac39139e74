//! # Threshold Bridge Benchmarks
//!
//! Hot paths of the bridge, measured per call:
//!
//! | Subsystem | Operation | Called |
//! |-----------|-----------|--------|
//! | tb-01 Address Derivation | CREATE2 token/burner address | per link |
//! | tb-01 Address Derivation | P2WSH deposit script | per link |
//! | tb-04 Signing Pipeline | EIP-155 signing hash | per outgoing tx |
//! | tb-04 Signing Pipeline | Segwit v0 sighash | per outgoing tx |

#![allow(clippy::excessive_nesting)]

use bitcoin::absolute::LockTime;
use bitcoin::hashes::Hash as _;
use bitcoin::transaction::Version;
use bitcoin::{Amount, Network, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use k256::ecdsa::SigningKey;
use primitive_types::U256;
use rand::Rng;
use shared_types::CrossChainAddress;
use std::time::Duration;
use tb_01_address_derivation::domain::deposit_script::{deposit_address, deposit_script};
use tb_01_address_derivation::{derive_burner_address, derive_token_address, TokenInfo};
use tb_04_signing_pipeline::domain::bitcoin_spend;
use tb_04_signing_pipeline::{EvmTransaction, SpendInfo};

// ============================================================================
// TB-01: Address Derivation
// ============================================================================

fn bench_evm_address_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("tb-01-evm-derivation");
    group.measurement_time(Duration::from_secs(5));

    let gateway = [0x11u8; 20];
    let token_bytecode = vec![0x60u8; 4_096];
    let burner_bytecode = vec![0x61u8; 1_024];
    let info = TokenInfo {
        token_name: "Satoshi".into(),
        symbol: "satoshi".into(),
        decimals: 8,
        capacity: U256::from(21_000_000u64) * U256::from(100_000_000u64),
        confirmed: true,
    };

    group.bench_function("token_address", |b| {
        b.iter(|| black_box(derive_token_address(&gateway, &token_bytecode, &info)))
    });

    let token = derive_token_address(&gateway, &token_bytecode, &info);
    let recipients: Vec<CrossChainAddress> = (0..100)
        .map(|i| CrossChainAddress::new("Axelar", format!("axelar1recipient{}", i)))
        .collect();

    group.throughput(Throughput::Elements(recipients.len() as u64));
    group.bench_function("burner_address_batch", |b| {
        b.iter(|| {
            for recipient in &recipients {
                black_box(derive_burner_address(
                    &gateway,
                    &burner_bytecode,
                    token,
                    "satoshi",
                    recipient,
                ));
            }
        })
    });

    group.finish();
}

fn bench_bitcoin_deposit_address(c: &mut Criterion) {
    let mut group = c.benchmark_group("tb-01-bitcoin-derivation");

    let key = SigningKey::random(&mut rand::thread_rng());
    let public_key = key.verifying_key().to_encoded_point(true).as_bytes().to_vec();
    let recipient = CrossChainAddress::new("Axelar", "axelar1recipient");

    group.bench_function("p2wsh_deposit_address", |b| {
        b.iter(|| {
            let script = deposit_script(&public_key, Some(&recipient)).unwrap();
            black_box(deposit_address(&script, Network::Regtest))
        })
    });

    group.finish();
}

// ============================================================================
// TB-04: Signing Hashes
// ============================================================================

fn bench_evm_signing_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("tb-04-evm-signing-hash");
    let mut rng = rand::thread_rng();

    for size in [0usize, 256, 4_096] {
        let data: Vec<u8> = (0..size).map(|_| rng.gen()).collect();
        let tx = EvmTransaction {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 300_000,
            to: Some([0x35; 20]),
            value: U256::zero(),
            data,
            deposits: vec![],
        };

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("eip155", size), &tx, |b, tx| {
            b.iter(|| black_box(tx.signing_hash(1)))
        });
    }

    group.finish();
}

fn bench_bitcoin_sighash(c: &mut Criterion) {
    let mut group = c.benchmark_group("tb-04-bitcoin-sighash");

    let key = SigningKey::random(&mut rand::thread_rng());
    let public_key = key.verifying_key().to_encoded_point(true).as_bytes().to_vec();
    let script = deposit_script(&public_key, None).unwrap();
    let spend = SpendInfo {
        witness_script: script.to_bytes(),
        amount: 50_000,
    };
    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: Txid::from_byte_array([0x42; 32]),
                vout: 0,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(49_000),
            script_pubkey: ScriptBuf::new(),
        }],
    };

    group.bench_function("p2wsh_sighash_all", |b| {
        b.iter(|| black_box(bitcoin_spend::signing_hash(&tx, &spend).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_evm_address_derivation,
    bench_bitcoin_deposit_address,
    bench_evm_signing_hash,
    bench_bitcoin_sighash,
);

criterion_main!(benches);
