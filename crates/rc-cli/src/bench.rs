use std::cmp::Ordering;
use std::time::Instant;

use url::Url;

use rc_core::{Config, DomainLookup, Pattern, PolicyCode, Resolver, Rule, RuleAction};

pub struct BenchOptions {
    pub iterations: usize,
    pub pages: usize,
    pub reqs_per_page: usize,
    pub synthetic_rules: usize,
    pub seed: u32,
}

struct BenchRequest {
    source: Option<Url>,
    target: Url,
}

struct BenchResult {
    op_count: usize,
    total_ms: f64,
    avg_us: f64,
    p50_us: f64,
    p95_us: f64,
    p99_us: f64,
    ops_per_sec: u64,
    untouched_pct: f64,
}

pub const DEFAULT_SEED: u32 = 0xc0ffee;

const SITES: &[&str] = &[
    "www.example.com",
    "news.example.co.uk",
    "shop.example.org",
    "blog.example.net",
    "mail.example.jp",
    "app.example.io",
];

const THIRD_PARTIES: &[&str] = &[
    "ads.tracker.com",
    "pixel.tracker.com",
    "cdn.jsdelivr.net",
    "fonts.gstatic.com",
    "img.cdn.example.net",
    "api.analytics.io",
    "static.example.com",
    "192.168.1.20",
];

const PATHS: &[&str] = &["/", "/index.html", "/pixel.gif?id=42", "/lib/app.js", "/a/b/c?q=1&r=2"];

pub fn run(config: &Config, lookup: &dyn DomainLookup, opts: BenchOptions) -> Result<(), String> {
    println!("============================================================");
    println!("Referrer Control Benchmark");
    println!("============================================================");

    let mut config = config.clone();
    if config.rules.is_empty() && opts.synthetic_rules > 0 {
        config.rules = synthetic_rules(opts.synthetic_rules)?;
    }

    let requests = generate_workload(opts.pages, opts.reqs_per_page, opts.seed)?;
    println!(
        "Rules: {}, requests: {} (pages={}, reqs/page={}, seed={})",
        config.rules.len(),
        requests.len(),
        opts.pages,
        opts.reqs_per_page,
        opts.seed
    );

    let resolver = Resolver::new(lookup);

    println!("Warming up...");
    for req in &requests {
        let _ = resolver.resolve_config(&config, req.source.as_ref(), &req.target);
    }

    let result = run_batched(&resolver, &config, &requests, opts.iterations);
    println!("{}", format_result(&result));

    Ok(())
}

fn run_batched(resolver: &Resolver<'_>, config: &Config, requests: &[BenchRequest], iterations: usize) -> BenchResult {
    let mut samples_us = Vec::with_capacity(requests.len() * iterations.max(1));
    let mut untouched = 0usize;
    let start = Instant::now();

    for _ in 0..iterations.max(1) {
        for req in requests {
            let t = Instant::now();
            let decision = resolver.resolve_config(config, req.source.as_ref(), &req.target);
            samples_us.push(t.elapsed().as_secs_f64() * 1_000_000.0);
            if decision.value.is_none() {
                untouched += 1;
            }
        }
    }

    let total_ops = samples_us.len();
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;
    samples_us.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    BenchResult {
        op_count: total_ops,
        total_ms,
        avg_us: if total_ops == 0 { 0.0 } else { total_ms * 1000.0 / total_ops as f64 },
        p50_us: percentile(&samples_us, 0.50),
        p95_us: percentile(&samples_us, 0.95),
        p99_us: percentile(&samples_us, 0.99),
        ops_per_sec: if total_ms > 0.0 { (total_ops as f64 / (total_ms / 1000.0)) as u64 } else { 0 },
        untouched_pct: if total_ops > 0 { (untouched as f64 / total_ops as f64) * 100.0 } else { 0.0 },
    }
}

fn format_result(result: &BenchResult) -> String {
    format!(
        "Resolve:\n  Ops: {}\n  Total: {:.2} ms\n  Mean: {:.2} us\n  P50: {:.2} us\n  P95: {:.2} us\n  P99: {:.2} us\n  Throughput: {} ops/sec\n  Untouched: {:.1}%",
        result.op_count,
        result.total_ms,
        result.avg_us,
        result.p50_us,
        result.p95_us,
        result.p99_us,
        result.ops_per_sec,
        result.untouched_pct,
    )
}

fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let idx = ((values.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(values.len() - 1);
    values[idx]
}

fn create_rng(seed: u32) -> impl FnMut() -> f64 {
    let mut state = seed;
    move || {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        (state as f64) / (u32::MAX as f64)
    }
}

fn pick<T: Copy>(items: &[T], rand: &mut impl FnMut() -> f64) -> T {
    let idx = (rand() * items.len() as f64).floor() as usize;
    items[idx.min(items.len() - 1)]
}

fn parse(raw: &str) -> Result<Url, String> {
    Url::parse(raw).map_err(|e| format!("Bad workload URL '{}': {}", raw, e))
}

/// Page loads followed by their subresources; the first request of each
/// page has no referrer.
fn generate_workload(pages: usize, reqs_per_page: usize, seed: u32) -> Result<Vec<BenchRequest>, String> {
    let mut rng = create_rng(seed);
    let mut requests = Vec::with_capacity(pages * (reqs_per_page + 1));

    for _ in 0..pages {
        let page = parse(&format!("https://{}{}", pick(SITES, &mut rng), pick(PATHS, &mut rng)))?;
        requests.push(BenchRequest {
            source: None,
            target: page.clone(),
        });

        for _ in 0..reqs_per_page {
            let host = if rng() < 0.3 {
                page.host_str().unwrap_or_default().to_string()
            } else {
                pick(THIRD_PARTIES, &mut rng).to_string()
            };
            let scheme = if rng() < 0.9 { "https" } else { "http" };
            requests.push(BenchRequest {
                source: Some(page.clone()),
                target: parse(&format!("{}://{}{}", scheme, host, pick(PATHS, &mut rng)))?,
            });
        }
    }

    Ok(requests)
}

fn synthetic_rules(count: usize) -> Result<Vec<Rule>, String> {
    let mut rules = Vec::with_capacity(count);
    for i in 0..count {
        let target = match i % 3 {
            0 => format!("*.site{i}.example"),
            1 => format!("/^https?://([^/]+\\.)?host{i}\\.test//"),
            _ => format!("https://exact{i}.example/*"),
        };
        let action = if i % 5 == 0 {
            RuleAction::Literal(format!("https://site{i}.example/"))
        } else {
            RuleAction::Policy(PolicyCode::ALL[i % PolicyCode::ALL.len()])
        };
        let target = Pattern::compile(Some(&target)).map_err(|e| e.to_string())?;
        rules.push(Rule::new(Pattern::Any, target, action));
    }
    Ok(rules)
}
