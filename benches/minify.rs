//! Benchmarks for the minification pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use trimcss::{Minifier, OptimizationLevel, Options, tokenize};

/// A stylesheet with repeated selectors, shared bodies and media blocks.
fn sample_stylesheet() -> String {
    let mut css = String::new();
    for i in 0..200 {
        css.push_str(&format!(
            ".item-{i} {{ color: #ff0000; margin: 0px 0px 0px 0px; padding: {i}px; }}\n"
        ));
        css.push_str(&format!(
            ".item-{i}:hover {{ color: rgb(0, 0, 255); border-top: 1px solid white; }}\n"
        ));
        if i % 10 == 0 {
            css.push_str(&format!(
                "@media (max-width: {i}px) {{ .item-{i} {{ display: none }} }}\n"
            ));
        }
        if i % 7 == 0 {
            css.push_str(&format!("/* section {i} */\n.item-{} {{ color: red }}\n", i / 2));
        }
    }
    css
}

// ============================================================================
// Tokenizer
// ============================================================================

fn bench_tokenize(c: &mut Criterion) {
    let css = sample_stylesheet();
    c.bench_function("tokenize", |b| {
        b.iter(|| {
            let mut warnings = Vec::new();
            tokenize(black_box(&css), &mut warnings)
        });
    });
}

// ============================================================================
// Optimization levels
// ============================================================================

fn bench_levels(c: &mut Criterion) {
    let css = sample_stylesheet();
    let mut group = c.benchmark_group("minify");

    for (name, level) in [
        ("level0", OptimizationLevel::Zero),
        ("level1", OptimizationLevel::One),
        ("level2", OptimizationLevel::Two),
    ] {
        let minifier = Minifier::new(Options::with_level(level)).unwrap();
        group.bench_function(name, |b| b.iter(|| minifier.minify(black_box(&css))));
    }

    group.finish();
}

fn bench_restructure(c: &mut Criterion) {
    let css = sample_stylesheet();
    let mut options = Options::with_level(OptimizationLevel::Two);
    options.level2.restructure_rules = true;
    let minifier = Minifier::new(options).unwrap();

    c.bench_function("minify_restructure", |b| {
        b.iter(|| minifier.minify(black_box(&css)));
    });
}

criterion_group!(benches, bench_tokenize, bench_levels, bench_restructure);
criterion_main!(benches);
