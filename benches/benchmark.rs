//! Performance benchmarks for FastJuncLift
//!
//! Run with: cargo bench
//!
//! Uses a synthetic chain (one 200bp insertion every 10kb) so no external
//! data is needed.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fast_junclift::core::{parse_chain_bytes, ChainIndex, MappingIndex};
use fast_junclift::formats::{convert_reader, ConvertOptions, JuncRecord, SpliceSiteRecord};

const CONTIG_SIZE: u64 = 10_000_000;
const BLOCK_SIZE: u64 = 10_000;
const INSERTION: u64 = 200;

fn synthetic_chain() -> Vec<u8> {
    let blocks = CONTIG_SIZE / BLOCK_SIZE;
    let target_size = CONTIG_SIZE + (blocks - 1) * INSERTION;
    let mut chain = format!(
        "chain 1000 chr1 {0} + 0 {0} chr1 {1} + 0 {1} 1\n",
        CONTIG_SIZE, target_size
    );
    for _ in 1..blocks {
        chain.push_str(&format!("{}\t0\t{}\n", BLOCK_SIZE, INSERTION));
    }
    chain.push_str(&format!("{}\n\n", BLOCK_SIZE));
    chain.into_bytes()
}

fn junctions(count: u64) -> String {
    (0..count)
        .map(|i| {
            let start = 1 + (i * 7919) % (CONTIG_SIZE - 5000);
            format!("chr1\t{}\t{}\tJ{}\t{}\t+\n", start, start + 1 + i % 4000, i, i % 50)
        })
        .collect()
}

fn splice_sites(count: u64) -> String {
    (0..count)
        .map(|i| {
            let start = 1 + (i * 7919) % (CONTIG_SIZE - 5000);
            format!(
                "chr1\t{}\t{}\t1\t1\t{}\t{}\t{}\t{}\n",
                start,
                start + 1 + i % 4000,
                i % 2,
                i % 100,
                i % 7,
                i % 90
            )
        })
        .collect()
}

/// Benchmark chain parsing and index construction
fn bench_index_build(c: &mut Criterion) {
    let chain = synthetic_chain();

    c.bench_function("index_build_haploid", |b| {
        b.iter(|| {
            let parsed = parse_chain_bytes(black_box(&chain)).unwrap();
            black_box(ChainIndex::haploid(parsed, false))
        })
    });
}

/// Benchmark a single oracle query
fn bench_find_mappings(c: &mut Criterion) {
    let index = ChainIndex::haploid(parse_chain_bytes(&synthetic_chain()).unwrap(), false);

    c.bench_function("find_mappings_spanning_gap", |b| {
        b.iter(|| black_box(index.find_mappings(black_box("chr1"), black_box(9_900), black_box(10_100))))
    });
}

/// Benchmark full record conversion
fn bench_conversion(c: &mut Criterion) {
    let index = ChainIndex::haploid(parse_chain_bytes(&synthetic_chain()).unwrap(), false);
    let options = ConvertOptions {
        progress_interval: 0,
        ..ConvertOptions::default()
    };

    let mut group = c.benchmark_group("conversion");

    for size in [1_000u64, 10_000, 100_000].iter() {
        let junc_input = junctions(*size);
        let tab_input = splice_sites(*size);
        group.throughput(Throughput::Elements(*size));

        group.bench_with_input(BenchmarkId::new("junc", size), &junc_input, |b, input| {
            b.iter(|| {
                let mut out = Vec::with_capacity(input.len());
                let mut unmapped = Vec::new();
                convert_reader::<JuncRecord>(&index, input.as_bytes(), &mut out, &mut unmapped, options)
                    .unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("tab", size), &tab_input, |b, input| {
            b.iter(|| {
                let mut out = Vec::with_capacity(input.len());
                let mut unmapped = Vec::new();
                convert_reader::<SpliceSiteRecord>(&index, input.as_bytes(), &mut out, &mut unmapped, options)
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_index_build, bench_find_mappings, bench_conversion);
criterion_main!(benches);
