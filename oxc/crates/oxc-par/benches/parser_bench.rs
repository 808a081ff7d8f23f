//! Parser benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oxc_par::parse_source;

fn sample_document(blocks: usize) -> String {
    let mut source = String::from("<set base = 4>\n");
    for i in 0..blocks {
        source.push_str(&format!(
            "[Card{i} (width: (base * {i}), title: \"card {i}\")\n  \
             <if (base > 2)>[Badge (n: {i})]</if>\n  \
             [Body (pad: 8)]\n]\n"
        ));
    }
    source
}

fn bench_parser(c: &mut Criterion) {
    let small = sample_document(10);
    let large = sample_document(500);

    c.bench_function("parse_small_document", |b| {
        b.iter(|| parse_source(black_box(&small), "bench.ox").unwrap())
    });

    c.bench_function("parse_large_document", |b| {
        b.iter(|| parse_source(black_box(&large), "bench.ox").unwrap())
    });
}

criterion_group!(benches, bench_parser);
criterion_main!(benches);
