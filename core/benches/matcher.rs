//! Matcher Benchmarks
//!
//! Scoring cost against knowledge snapshots of increasing size.
//!
//! Run with: `cargo bench --bench matcher`

#![allow(missing_docs)] // Benchmarks don't need extensive docs

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dudu_hub_core::knowledge::KnowledgeEntry;
use dudu_hub_core::matcher::{QueryMatcher, tokenize};

fn knowledge(size: usize) -> Vec<KnowledgeEntry> {
    (0..size)
        .map(|i| {
            KnowledgeEntry::new(
                format!("question {i} about industrial visit packages and booking"),
                format!("answer {i}"),
            )
        })
        .collect()
}

fn benchmark_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize", |b| {
        b.iter(|| black_box(tokenize(black_box("Hey, tell me what is DUDU please?"))));
    });
}

fn benchmark_find_answer(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_answer");
    let matcher = QueryMatcher::default();

    for size in [10, 100, 1_000] {
        let entries = knowledge(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &entries, |b, entries| {
            b.iter(|| black_box(matcher.find_answer(black_box("How do I book a visit?"), entries)));
        });
    }

    group.finish();
}

fn benchmark_rank(c: &mut Criterion) {
    let matcher = QueryMatcher::default();
    let entries = knowledge(1_000);

    c.bench_function("rank_top_5", |b| {
        b.iter(|| black_box(matcher.rank(black_box("package prices"), &entries, 5)));
    });
}

criterion_group!(benches, benchmark_tokenize, benchmark_find_answer, benchmark_rank);
criterion_main!(benches);
