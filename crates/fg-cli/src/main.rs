//! FocusGate CLI
//!
//! CLI tool for checking URLs against a blocking policy, explaining and
//! linting policies, and measuring decision latency.

mod bench;

use std::path::Path;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use fg_core::{lint, parse_pattern, CompiledPolicy, Mode, PatternKind, Policy, Verdict};

use crate::bench::BenchOptions;

#[derive(Parser)]
#[command(name = "fg-cli")]
#[command(about = "FocusGate URL blocking policy tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    policy: PolicyArgs,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Policy source: an optional JSON file with flag overrides layered on top.
#[derive(Args)]
struct PolicyArgs {
    /// Policy JSON file
    #[arg(short, long, global = true)]
    policy: Option<String>,

    /// Blocking mode (blacklist, whitelist, combined)
    #[arg(short, long, global = true)]
    mode: Option<String>,

    /// Allow pattern (repeatable)
    #[arg(long = "allow", global = true)]
    allow: Vec<String>,

    /// Deny pattern (repeatable)
    #[arg(long = "deny", global = true)]
    deny: Vec<String>,

    /// Allow keyword, literal or /regex/flags (repeatable)
    #[arg(long = "allow-keyword", global = true)]
    allow_keywords: Vec<String>,

    /// Deny keyword, literal or /regex/flags (repeatable)
    #[arg(long = "deny-keyword", global = true)]
    deny_keywords: Vec<String>,

    /// Treat blocking as switched off
    #[arg(long, global = true)]
    disabled: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether each URL is blocked
    Check {
        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,

        /// Print verdicts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show every rule that matched a URL
    Explain {
        /// URL to explain
        url: String,

        /// Print the explanation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report entries the engine would degrade or skip
    Lint {
        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a single pattern is parsed and scored
    Parse {
        /// Pattern to parse
        pattern: String,
    },

    /// Measure decision latency against a p99 budget
    Bench {
        /// File with one URL per line (built-in set if omitted)
        #[arg(short, long)]
        urls: Option<String>,

        /// Passes over the URL set
        #[arg(long, default_value_t = 2000)]
        iterations: usize,

        /// p99 budget in microseconds
        #[arg(long, default_value_t = 1000.0)]
        budget_us: f64,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { urls, json } => cmd_check(&cli.policy, &urls, json),
        Commands::Explain { url, json } => cmd_explain(&cli.policy, &url, json),
        Commands::Lint { json } => cmd_lint(&cli.policy, json),
        Commands::Parse { pattern } => cmd_parse(&pattern),
        Commands::Bench {
            urls,
            iterations,
            budget_us,
        } => load_policy(&cli.policy).and_then(|policy| {
            bench::run_bench(BenchOptions {
                policy,
                urls_path: urls,
                iterations,
                budget_us,
            })
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_policy(args: &PolicyArgs) -> Result<Policy, String> {
    let mut policy = match &args.policy {
        Some(path) => Policy::load(Path::new(path))
            .map_err(|e| format!("Failed to load policy '{}': {}", path, e))?,
        None => Policy::default(),
    };

    if let Some(mode) = &args.mode {
        policy.mode = mode.parse::<Mode>().map_err(|e| e.to_string())?;
    }
    if args.disabled {
        policy.enabled = false;
    }

    let policy = policy
        .with_allow(args.allow.iter().cloned())
        .with_deny(args.deny.iter().cloned())
        .with_allow_keywords(args.allow_keywords.iter().cloned())
        .with_deny_keywords(args.deny_keywords.iter().cloned());

    log::debug!(
        "policy: mode={} enabled={} allow={} deny={} keywords={}",
        policy.mode,
        policy.enabled,
        policy.allow.len(),
        policy.deny.len(),
        policy.allow_keywords.len() + policy.deny_keywords.len()
    );
    Ok(policy)
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    url: &'a str,
    #[serde(flatten)]
    verdict: &'a Verdict,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to encode JSON: {}", e))
}

fn cmd_check(args: &PolicyArgs, urls: &[String], json: bool) -> Result<(), String> {
    let policy = load_policy(args)?;
    let compiled = CompiledPolicy::compile(&policy);

    let verdicts: Vec<Verdict> = urls.iter().map(|url| compiled.evaluate(url)).collect();

    if json {
        let out: Vec<CheckOutput> = urls
            .iter()
            .zip(&verdicts)
            .map(|(url, verdict)| CheckOutput { url, verdict })
            .collect();
        println!("{}", to_json(&out)?);
        return Ok(());
    }

    for (url, verdict) in urls.iter().zip(&verdicts) {
        let status = if verdict.blocked { "BLOCK" } else { "ALLOW" };
        println!("{}  {}  ({})", status, url, verdict.reason);
    }

    Ok(())
}

fn cmd_explain(args: &PolicyArgs, url: &str, json: bool) -> Result<(), String> {
    let policy = load_policy(args)?;
    let explanation = CompiledPolicy::compile(&policy).explain(url);

    if json {
        println!("{}", to_json(&explanation)?);
        return Ok(());
    }

    let verdict = &explanation.verdict;
    println!("URL:      {}", url);
    println!("Mode:     {}{}", policy.mode, if policy.enabled { "" } else { " (disabled)" });
    println!("Blocked:  {}", verdict.blocked);
    println!("Reason:   {}", verdict.reason);
    if let Some(specificity) = verdict.specificity {
        println!("Score:    {}", specificity);
    }
    if let Some(warning) = &explanation.warning {
        println!("Warning:  {}", warning);
    }
    println!();

    if explanation.matches.is_empty() {
        println!("No matching rules");
        return Ok(());
    }

    println!("Matching rules ({}):", explanation.matches.len());
    for m in &explanation.matches {
        let list = m.list.as_str();
        let source = m.source.as_str();
        println!("  {:>10}  {:<5} {:<7}  {}", m.specificity, list, source, m.literal);
    }

    Ok(())
}

fn cmd_lint(args: &PolicyArgs, json: bool) -> Result<(), String> {
    let policy = load_policy(args)?;
    let diagnostics = lint(&policy);

    if json {
        println!("{}", to_json(&diagnostics)?);
        return Ok(());
    }

    if diagnostics.is_empty() {
        println!("Policy is clean");
        return Ok(());
    }

    for d in &diagnostics {
        let list = d.list.as_str();
        let source = d.source.as_str();
        println!("{} {}[{}] '{}': {}", list, source, d.index, d.entry, d.message);
    }
    println!();
    println!("{} problem(s) found", diagnostics.len());

    Ok(())
}

fn cmd_parse(pattern: &str) -> Result<(), String> {
    let parsed = parse_pattern(pattern).map_err(|e| e.to_string())?;
    let specificity = fg_core::calculate_specificity(&parsed);

    println!("Pattern: {}", parsed.raw);
    match &parsed.kind {
        PatternKind::RawRegex(regex) => {
            println!("  Kind:        raw regex");
            println!("  Source:      {}", regex.source);
            println!("  Compiles:    {}", regex.regex.is_some());
        }
        PatternKind::Url(p) => {
            println!("  Kind:        url");
            println!("  Protocol:    {}", p.protocol.as_deref().unwrap_or("(any)"));
            println!("  Hostname:    {}", p.hostname);
            println!("  Base domain: {}", p.base_domain);
            println!("  Subdomains:  {}", p.is_wildcard_subdomain);
            println!("  Path:        {}", if p.path.is_empty() { "(any)" } else { &p.path });
            println!("  Wildcard:    {}", p.has_wildcard_suffix);
            println!("  Anchored:    {}", p.is_exact_anchor);
            if let Some(resource) = &p.resource_segment {
                println!("  Resource:    {}", resource);
            }
        }
    }
    println!("  Specificity: {}", specificity);
    if let Some(d) = &parsed.degradation {
        println!("  Warning:     {}", d);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(mode: Option<&str>) -> PolicyArgs {
        PolicyArgs {
            policy: None,
            mode: mode.map(str::to_string),
            allow: vec!["reddit.com/r/rust/*".to_string()],
            deny: vec!["reddit.com".to_string()],
            allow_keywords: Vec::new(),
            deny_keywords: vec!["casino".to_string()],
            disabled: false,
        }
    }

    #[test]
    fn test_flags_build_policy() {
        let policy = load_policy(&args(Some("denylist"))).unwrap();
        assert_eq!(policy.mode, Mode::Blacklist);
        assert_eq!(policy.allow_patterns(), vec!["reddit.com/r/rust/*"]);
        assert_eq!(policy.deny_patterns(), vec!["reddit.com"]);
        assert_eq!(policy.deny_keywords, vec!["casino".to_string()]);
        assert!(policy.enabled);
    }

    #[test]
    fn test_unknown_mode_flag_is_an_error() {
        assert!(load_policy(&args(Some("strict"))).is_err());
    }

    #[test]
    fn test_missing_policy_file_is_an_error() {
        let mut args = args(None);
        args.policy = Some("/nonexistent/policy.json".to_string());
        let err = load_policy(&args).unwrap_err();
        assert!(err.starts_with("Failed to load policy"));
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fg-cli",
            "check",
            "https://reddit.com",
            "--deny",
            "reddit.com",
            "--mode",
            "combined",
        ])
        .unwrap();
        assert_eq!(cli.policy.deny, vec!["reddit.com".to_string()]);
        assert_eq!(cli.policy.mode.as_deref(), Some("combined"));
        assert!(matches!(cli.command, Commands::Check { .. }));
    }
}
