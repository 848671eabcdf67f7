// Wire and document codec benchmarks for the Nxt core.
//
// Covers registry lookup, transaction encoding and parsing at several message
// sizes, document decoding, and Reed-Solomon account string conversion.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use nxt_core::identifier::{from_rs, to_rs};
use nxt_core::transaction::types::{self, messaging};
use nxt_core::transaction::{ArbitraryMessage, Transaction, TransactionBuilder};
use nxt_core::Response;

fn message_tx(len: usize) -> Transaction {
    TransactionBuilder::new(&messaging::ARBITRARY_MESSAGE, [0x42; 32])
        .timestamp(60_000_000)
        .fee_nqt(100_000_000)
        .attachment(ArbitraryMessage::binary(vec![0xA5; len]).unwrap())
        .build()
        .unwrap()
        .signed([0x11; 64])
}

fn bench_registry_lookup(c: &mut Criterion) {
    c.bench_function("registry/find_all_pairs", |b| {
        b.iter(|| {
            let mut hits = 0;
            for tx_type in 0..8u8 {
                for subtype in 0..16u8 {
                    hits += types::find(tx_type, subtype).is_some() as usize;
                }
            }
            hits
        });
    });
}

fn bench_encode_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction/bytes");

    for len in [0, 100, 1000] {
        let tx = message_tx(len);
        let bytes = tx.bytes();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", len), &tx, |b, tx| {
            b.iter(|| tx.bytes());
        });
        group.bench_with_input(BenchmarkId::new("parse", len), &bytes, |b, bytes| {
            b.iter(|| Transaction::parse(bytes).unwrap());
        });
    }

    group.finish();
}

fn bench_full_hash(c: &mut Criterion) {
    let tx = message_tx(1000);
    c.bench_function("transaction/full_hash", |b| {
        b.iter(|| tx.full_hash());
    });
}

fn bench_document_decode(c: &mut Criterion) {
    let doc = Response::new(message_tx(100).to_document());
    c.bench_function("transaction/from_response", |b| {
        b.iter(|| Transaction::from_response(&doc).unwrap());
    });
}

fn bench_reed_solomon(c: &mut Criterion) {
    let rs = to_rs(-4_242_424_242_424_242);
    c.bench_function("identifier/to_rs", |b| {
        b.iter(|| to_rs(-4_242_424_242_424_242));
    });
    c.bench_function("identifier/from_rs", |b| {
        b.iter(|| from_rs(&rs).unwrap());
    });
}

criterion_group!(
    benches,
    bench_registry_lookup,
    bench_encode_parse,
    bench_full_hash,
    bench_document_decode,
    bench_reed_solomon,
);
criterion_main!(benches);
