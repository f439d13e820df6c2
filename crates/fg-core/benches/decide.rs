use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fg_core::{decide, CompiledPolicy, Mode, Policy};

const URLS: &[&str] = &[
    "https://www.reddit.com/r/askscience/comments/abc/why_is_the_sky_blue/",
    "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
    "https://news.ycombinator.com/item?id=1",
    "https://docs.rs/serde/latest/serde/",
    "https://example.com/",
];

fn policy() -> Policy {
    Policy::new(Mode::Combined)
        .with_allow(["reddit.com/r/askscience/*", "docs.rs", "*.wikipedia.org"])
        .with_deny(["reddit.com", "youtube.com", "^https://news\\.", "*.twitter.com", "x.com$"])
        .with_allow_keywords(["/lecture|tutorial/i"])
        .with_deny_keywords(["casino", "/shorts/i"])
}

fn bench_decide(c: &mut Criterion) {
    let policy = policy();
    let allow = policy.allow_patterns();
    let deny = policy.deny_patterns();

    c.bench_function("decide_stateless", |b| {
        b.iter(|| {
            for url in URLS {
                black_box(decide(
                    black_box(url),
                    &allow,
                    &deny,
                    &policy.allow_keywords,
                    &policy.deny_keywords,
                    "combined",
                    true,
                ));
            }
        })
    });

    let compiled = CompiledPolicy::compile(&policy);
    c.bench_function("evaluate_compiled", |b| {
        b.iter(|| {
            for url in URLS {
                black_box(compiled.evaluate(black_box(url)));
            }
        })
    });
}

criterion_group!(benches, bench_decide);
criterion_main!(benches);
