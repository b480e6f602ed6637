// Encoding & hashing benchmarks for the MMX wallet engine.
//
// Covers the Variant codec, both transaction hash modes at growing sizes,
// the cost model, and the compressed transport form.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use mmx_protocol::codec::Variant;
use mmx_protocol::params::ChainParams;
use mmx_protocol::transaction::{Execute, Transaction, TxNote};
use mmx_protocol::types::{Address, Uint128};

fn sample_transaction(entries: usize) -> Transaction {
    let mut tx = Transaction::new(TxNote::Transfer);
    tx.network = "mainnet".into();
    tx.nonce = 42;
    for i in 0..entries {
        let who = Address::new([i as u8; 32]);
        tx.add_input(Address::ZERO, who, Uint128::from(1_000_000u64 + i as u64));
        tx.add_output(Address::ZERO, who, Uint128::from(999_000u64))
            .0
            .memo = Some(format!("payment {i}"));
    }
    tx.execute.push(
        Execute::new(
            Address::new([0xAA; 32]),
            "transfer",
            vec![Variant::from(5u64), Variant::from("note")],
        )
        .into(),
    );
    tx
}

fn sample_variant(width: usize) -> Variant {
    let mut object = BTreeMap::new();
    for i in 0..width {
        object.insert(
            format!("key{i:04}"),
            Variant::List(vec![
                Variant::from(i as u64),
                Variant::from(-(i as i64) - 1),
                Variant::from("value"),
            ]),
        );
    }
    Variant::Object(object)
}

fn bench_variant(c: &mut Criterion) {
    let value = sample_variant(64);
    let bytes = value.encode().unwrap();

    c.bench_function("variant/encode_object_64", |b| {
        b.iter(|| black_box(&value).encode().unwrap());
    });
    c.bench_function("variant/decode_object_64", |b| {
        b.iter(|| Variant::decode(black_box(&bytes)).unwrap());
    });
}

fn bench_transaction_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction/calc_hash");
    for entries in [1usize, 16, 128] {
        let tx = sample_transaction(entries);
        group.throughput(Throughput::Elements(entries as u64));
        group.bench_with_input(BenchmarkId::new("id", entries), &tx, |b, tx| {
            b.iter(|| tx.calc_hash(false).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("full", entries), &tx, |b, tx| {
            b.iter(|| tx.calc_hash(true).unwrap());
        });
    }
    group.finish();
}

fn bench_cost(c: &mut Criterion) {
    let params = ChainParams::mainnet();
    let tx = sample_transaction(16);
    c.bench_function("transaction/calc_cost_16", |b| {
        b.iter(|| tx.calc_cost(&params).unwrap());
    });
}

fn bench_transport(c: &mut Criterion) {
    let tx = sample_transaction(16);
    let packed = tx.to_transport().unwrap();

    c.bench_function("transport/pack_16", |b| {
        b.iter(|| tx.to_transport().unwrap());
    });
    c.bench_function("transport/unpack_16", |b| {
        b.iter(|| Transaction::from_transport(black_box(&packed)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_variant,
    bench_transaction_hash,
    bench_cost,
    bench_transport,
);
criterion_main!(benches);
