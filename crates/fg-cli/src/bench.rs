use std::fs;
use std::time::Instant;

use fg_core::{decide, CompiledPolicy, Policy};

pub struct BenchOptions {
    pub policy: Policy,
    pub urls_path: Option<String>,
    pub iterations: usize,
    pub budget_us: f64,
}

const BUILTIN_URLS: &[&str] = &[
    "https://www.reddit.com/r/askscience/comments/abc/why_is_the_sky_blue/",
    "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
    "https://news.ycombinator.com/item?id=1",
    "https://docs.rs/serde/latest/serde/",
    "https://m.twitter.com/home",
    "https://example.com/",
    "chrome://settings",
];

const WARMUP_OPS: usize = 1000;

pub fn run_bench(opts: BenchOptions) -> Result<(), String> {
    println!("Decision Latency Check");
    println!("==================================================");

    let urls = match &opts.urls_path {
        Some(path) => read_urls(path)?,
        None => BUILTIN_URLS.iter().map(|s| s.to_string()).collect(),
    };
    if urls.is_empty() {
        return Err("No URLs to measure".to_string());
    }

    let allow = opts.policy.allow_patterns();
    let deny = opts.policy.deny_patterns();
    let mode = opts.policy.mode.as_str();
    println!(
        "Policy: {} mode, {} allow / {} deny patterns, {} keywords",
        mode,
        allow.len(),
        deny.len(),
        opts.policy.allow_keywords.len() + opts.policy.deny_keywords.len()
    );
    println!("URLs:   {} x {} iterations", urls.len(), opts.iterations);

    let run_decide = |url: &str| {
        decide(
            url,
            &allow,
            &deny,
            &opts.policy.allow_keywords,
            &opts.policy.deny_keywords,
            mode,
            opts.policy.enabled,
        )
        .blocked
    };

    let compile_begin = Instant::now();
    let compiled = CompiledPolicy::compile(&opts.policy);
    let compile_us = compile_begin.elapsed().as_secs_f64() * 1_000_000.0;

    println!("Warming up...");
    for i in 0..WARMUP_OPS {
        let url = &urls[i % urls.len()];
        let _ = run_decide(url.as_str());
        let _ = compiled.evaluate(url).blocked;
    }

    println!("Measuring decide latency...");
    let decide_latencies = measure(&urls, opts.iterations, run_decide);
    println!("Measuring compiled latency...");
    let compiled_latencies = measure(&urls, opts.iterations, |url| compiled.evaluate(url).blocked);

    let blocked = urls.iter().filter(|url| compiled.evaluate(url).blocked).count();

    println!();
    println!("Results");
    println!("--------------------------------------------------");
    println!("Blocked: {} of {} URLs", blocked, urls.len());
    println!("Compile: {:.2} μs", compile_us);
    print_percentiles("decide", &decide_latencies);
    print_percentiles("evaluate", &compiled_latencies);
    println!();

    let p99 = percentile(&decide_latencies, 0.99);
    let passed = report_budget("Decide P99 Latency", p99, opts.budget_us, "μs");

    println!();
    println!("==================================================");

    if passed {
        println!("✓ Latency budget passed");
        Ok(())
    } else {
        Err("Latency budget exceeded".to_string())
    }
}

fn read_urls(path: &str) -> Result<Vec<String>, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn measure<F: Fn(&str) -> bool>(urls: &[String], iterations: usize, f: F) -> Vec<f64> {
    let mut latencies = Vec::with_capacity(urls.len() * iterations);

    for _ in 0..iterations {
        for url in urls {
            let start = Instant::now();
            let _ = std::hint::black_box(f(url.as_str()));
            latencies.push(start.elapsed().as_secs_f64() * 1_000_000.0);
        }
    }

    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    latencies
}

fn print_percentiles(name: &str, sorted: &[f64]) {
    println!(
        "{:<9} p50 {:.2} μs, p90 {:.2} μs, p99 {:.2} μs, max {:.2} μs",
        name,
        percentile(sorted, 0.50),
        percentile(sorted, 0.90),
        percentile(sorted, 0.99),
        sorted.last().copied().unwrap_or(0.0),
    );
}

fn report_budget(name: &str, actual: f64, limit: f64, unit: &str) -> bool {
    let passed = actual <= limit;
    let status = if passed { "✓" } else { "✗" };
    println!(
        "{} {}: {:.2} {} (limit: {:.2} {})",
        status, name, actual, unit, limit, unit
    );
    passed
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_picks_nearest_rank() {
        let sorted: Vec<f64> = (1..=100).map(f64::from).collect();
        assert_eq!(percentile(&sorted, 0.50), 50.0);
        assert_eq!(percentile(&sorted, 0.99), 99.0);
        assert_eq!(percentile(&sorted, 1.0), 100.0);
        assert_eq!(percentile(&[], 0.99), 0.0);
    }

    #[test]
    fn test_report_budget() {
        assert!(report_budget("x", 1.0, 2.0, "μs"));
        assert!(!report_budget("x", 3.0, 2.0, "μs"));
    }
}
