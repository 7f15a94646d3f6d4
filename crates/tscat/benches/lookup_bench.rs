//! Benchmarks for catalog parsing and lookup.
//!
//! Run with: `cargo bench --package tscat --bench lookup_bench`
//!
//! Catalogs are generated in the layout `lupdate` writes, with a mix of
//! finished, unfinished and placeholder-bearing messages spread over a
//! handful of contexts.
//!
//! # Criterion Output
//!
//! Results are written to `target/criterion/` per group:
//! - `parse/*`: reading TS text into a `Document`
//! - `catalog_build/*`: flattening a `Document` into a `Catalog`
//! - `lookup/*`: hit, miss and substitution lookups

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tscat::{Catalog, Document, LoadOptions, Message, ParseMode, parse_document, write_document};

const NONE: &[&str] = &[];

// ============================================================================
// Test Data Generation
// ============================================================================

/// A document with `messages` entries spread over ten contexts.
fn generate_document(messages: usize) -> Document {
    let mut doc = Document::new("de_DE");
    for i in 0..messages {
        let context = doc.context_mut(&format!("Widget{}", i % 10));
        let message = match i % 4 {
            0 => Message::unfinished(format!("Enable option {i}")),
            1 => Message::new(
                format!("Line: %1,  Position: %2 ({i})"),
                format!("Zeile: %1, Position: %2 ({i})"),
            ),
            _ => Message::new(format!("Message number {i}"), format!("Nachricht Nummer {i}")),
        };
        context
            .messages
            .push(message.with_location("../mainwindow.cpp", i as u32 + 1));
    }
    doc
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for size in [100, 1_000, 10_000] {
        let text = write_document(&generate_document(size));
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("lenient", size), &text, |b, text| {
            b.iter(|| parse_document(black_box(text), ParseMode::Lenient));
        });
    }
    group.finish();
}

fn bench_catalog_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_build");
    let options = LoadOptions::default();
    for size in [1_000, 10_000] {
        let doc = generate_document(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            b.iter(|| Catalog::from_document(black_box(doc), &options));
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let catalog = Catalog::from_document(&generate_document(10_000), &LoadOptions::default());
    let mut group = c.benchmark_group("lookup");

    group.bench_function("hit", |b| {
        b.iter(|| catalog.lookup(black_box("Widget2"), black_box("Message number 502"), NONE));
    });
    group.bench_function("unfinished_fallback", |b| {
        b.iter(|| catalog.lookup(black_box("Widget0"), black_box("Enable option 500"), NONE));
    });
    group.bench_function("miss", |b| {
        b.iter(|| catalog.lookup(black_box("Widget3"), black_box("Not in the catalog"), NONE));
    });
    group.bench_function("substitute", |b| {
        b.iter(|| {
            catalog.lookup(
                black_box("Widget1"),
                black_box("Line: %1,  Position: %2 (501)"),
                &["4", "10"],
            )
        });
    });
    group.bench_function("resolve_no_alloc", |b| {
        b.iter(|| catalog.resolve(black_box("Widget2"), black_box("Message number 502")));
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_catalog_build, bench_lookup);
criterion_main!(benches);
