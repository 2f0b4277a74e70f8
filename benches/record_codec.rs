//! Benchmarks for the record codec.
//!
//! Covers the three hot paths of a BAM pipeline built on this crate:
//! record iteration over a buffer, record serialization, and packed
//! sequence decoding.
//!
//! Run with: cargo bench --bench record_codec

use bamcodec::{sequence, Cigar, Record, Records};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Generate a DNA sequence of the given length
fn generate_sequence(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| [b'A', b'C', b'G', b'T'][i % 4])
        .collect()
}

/// Build a buffer of `count` serialized records with realistic fields
fn generate_record_buffer(count: usize, read_len: usize) -> Vec<u8> {
    let bases = generate_sequence(read_len);
    let qual = vec![30u8; read_len];
    let cigar_text = format!("{}M", read_len);
    let mut buffer = Vec::new();
    for i in 0..count {
        let mut record = Record::builder()
            .reference_id((i % 24) as i32)
            .position((i * 100) as i32)
            .read_name(format!("read_{:06}/1", i).as_bytes())
            .mapping_quality(60)
            .build()
            .unwrap();
        record.set_sequence(&bases, Some(&qual)).unwrap();
        record
            .set_cigar(Cigar::from_text(&cigar_text).unwrap())
            .unwrap();
        record.set_tag(*b"NM", (i % 5) as i32, None).unwrap();
        record.set_tag(*b"RG", "sample", None).unwrap();
        record.write_into(&mut buffer);
    }
    buffer
}

/// Benchmark iterating records out of a contiguous buffer
fn bench_record_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_iteration");

    for count in [100, 1_000, 10_000].iter() {
        let buffer = generate_record_buffer(*count, 100);

        group.throughput(Throughput::Bytes(buffer.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                Records::new(black_box(&buffer))
                    .map(|result| result.unwrap())
                    .count()
            })
        });
    }

    group.finish();
}

/// Benchmark serializing a parsed record back to bytes
fn bench_record_serialization(c: &mut Criterion) {
    let buffer = generate_record_buffer(1, 150);
    let record = Record::parse(&buffer).unwrap();

    c.bench_function("record_to_bytes", |b| {
        b.iter(|| black_box(&record).to_bytes())
    });
}

/// Benchmark 4-bit sequence decoding across read lengths
fn bench_sequence_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_decode");

    for len in [100, 1_000, 10_000, 100_000].iter() {
        let packed = sequence::encode(&generate_sequence(*len)).unwrap();

        group.throughput(Throughput::Bytes(*len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), len, |b, _| {
            b.iter(|| sequence::decode(black_box(&packed), *len).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_record_iteration,
    bench_record_serialization,
    bench_sequence_decode
);
criterion_main!(benches);
