//! Performance benchmarks for vcf4-reader
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use vcf4_reader::formats::aggregate_genotypes;
use vcf4_reader::{filters, SampleIndex, VcfReader, VcfRecord};

const HEADER: &str = "##fileformat=VCFv4.1\n\
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total depth\">\n\
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2\tS3\tS4\n";

/// Build an in-memory VCF with `n` records
fn synthetic_vcf(n: usize) -> String {
    let mut text = String::with_capacity(HEADER.len() + n * 64);
    text.push_str(HEADER);
    for i in 0..n {
        let filter = if i % 3 == 0 { "q10" } else { "PASS" };
        text.push_str(&format!(
            "chr{}\t{}\trs{}\tA\tG\t{}\t{}\tDP={};AF=0.5\tGT\t0/1\t1/1\t0/0\t./.\n",
            i % 22 + 1,
            1000 + i * 10,
            i,
            i % 100,
            filter,
            i % 60
        ));
    }
    text
}

/// Benchmark single line parsing
fn bench_record_parse(c: &mut Criterion) {
    let index = Arc::new(SampleIndex::new(["S1", "S2", "S3", "S4"]));
    let line = "chr1\t12345\trs1\tA\tG,T\t30\tPASS\tDP=100;AF=0.5;DB\tGT\t0/1\t1/1\t0/0\t./.";

    c.bench_function("record_parse", |b| {
        b.iter(|| VcfRecord::parse(black_box(line), &index))
    });
}

/// Benchmark batch reading with and without filters
fn bench_batch_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_read");

    for size in [1_000usize, 10_000] {
        let text = synthetic_vcf(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("unfiltered", size), &text, |b, text| {
            b.iter(|| {
                let mut reader = VcfReader::from_stream(text.as_bytes()).unwrap();
                black_box(reader.read_batch(size).unwrap())
            })
        });

        group.bench_with_input(BenchmarkId::new("pass_min_qual", size), &text, |b, text| {
            b.iter(|| {
                let mut reader = VcfReader::from_stream(text.as_bytes())
                    .unwrap()
                    .with_filter(filters::pass_only())
                    .with_filter(filters::min_quality(20.0));
                black_box(reader.read_batch(size).unwrap())
            })
        });
    }

    group.finish();
}

/// Benchmark GTS/GTC decoding
fn bench_genotype_aggregation(c: &mut Criterion) {
    let alts = vec!["A".to_string(), "C".to_string()];

    c.bench_function("aggregate_genotypes", |b| {
        b.iter(|| {
            aggregate_genotypes(
                black_box("A1A1,A1A2,A1R,A2A2,A2R,RR"),
                black_box("0,0,1,0,0,6502"),
                "G",
                &alts,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_record_parse,
    bench_batch_read,
    bench_genotype_aggregation
);
criterion_main!(benches);
