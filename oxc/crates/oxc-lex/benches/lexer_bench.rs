//! Lexer benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oxc_lex::Lexer;

fn sample_document(blocks: usize) -> String {
    let mut source = String::new();
    for i in 0..blocks {
        source.push_str(&format!(
            "[Panel{i} (width: {i}, label: \"panel {i}\", visible: true)\n  \
             [Child (idx: (1 + 2 * {i}))]\n  \
             ```\n  Body text for panel {i}.\n  ```\n]\n"
        ));
    }
    source
}

fn bench_lexer(c: &mut Criterion) {
    let small = sample_document(10);
    let large = sample_document(500);

    c.bench_function("lex_small_document", |b| {
        b.iter(|| {
            Lexer::new(black_box(&small), "bench.ox")
                .tokenize()
                .unwrap()
        })
    });

    c.bench_function("lex_large_document", |b| {
        b.iter(|| {
            Lexer::new(black_box(&large), "bench.ox")
                .tokenize()
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_lexer);
criterion_main!(benches);
