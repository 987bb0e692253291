//! Resolution latency benchmarks.
//!
//! Measures:
//! - pattern evaluation (wildcard and regex)
//! - full resolution over rule sets of growing size, worst case (no match)
//!
//! Run: cargo bench -p rc-core --bench resolve

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use url::Url;

use rc_core::{FallbackSuffixes, Pattern, PolicyCode, ResolveOptions, Resolver, Rule, RuleAction};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn synthetic_rules(count: usize) -> Vec<Rule> {
    (0..count)
        .map(|i| {
            let target = if i % 4 == 0 {
                format!("/^https?:\\/\\/([a-z]+\\.)*site{i}\\.example\\//")
            } else {
                format!("*.site{i}.example")
            };
            let action = if i % 3 == 0 {
                RuleAction::Literal(format!("https://site{i}.example/"))
            } else {
                RuleAction::Policy(PolicyCode::TargetHost)
            };
            Rule::new(Pattern::Any, Pattern::compile(Some(&target)).unwrap(), action)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_pattern(c: &mut Criterion) {
    let wildcard = Pattern::compile(Some("*.tracker.com")).unwrap();
    let regex = Pattern::compile(Some("/^https?:\\/\\/[^/]*tracker\\.com\\//")).unwrap();
    let url = "https://ads.eu.tracker.com/pixel.gif?id=1234567890";

    let mut group = c.benchmark_group("pattern");
    group.bench_function("wildcard", |b| b.iter(|| wildcard.test(black_box(url))));
    group.bench_function("regex", |b| b.iter(|| regex.test(black_box(url))));
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let resolver = Resolver::new(&FallbackSuffixes);
    let source = Url::parse("https://www.news.example.co.uk/article/42?utm=x").unwrap();
    let target = Url::parse("https://cdn.unmatched.net/lib.js").unwrap();
    let options = ResolveOptions::default();

    let mut group = c.benchmark_group("resolve");
    for size in [0usize, 10, 100, 1000] {
        let rules = synthetic_rules(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &rules, |b, rules| {
            b.iter(|| {
                resolver.resolve(
                    black_box(Some(&source)),
                    black_box(&target),
                    rules,
                    PolicyCode::SourceDomain,
                    options,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pattern, bench_resolve);
criterion_main!(benches);
