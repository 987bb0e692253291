//! Referrer Control CLI
//!
//! CLI tool for checking, converting and exercising referrer rule sets.

mod bench;
mod rules;

use clap::{ArgAction, Parser, Subcommand};
use env_logger::{Builder, Env};

use rc_compiler::{
    build_rule_file, import_rule_file, merge_rules, parse_rules, parse_rules_with_report,
    serialize_rules,
};
use rc_core::url::{parse_source, parse_url};
use rc_core::{DecisionReason, PolicyCode, Resolver};

#[derive(Parser)]
#[command(name = "rc-cli")]
#[command(about = "Referrer Control rule tools")]
struct Cli {
    /// Public Suffix List file (public_suffix_list.dat); a heuristic is used otherwise
    #[arg(long, global = true)]
    psl: Option<String>,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide the referrer for one request
    Resolve {
        /// URL being requested
        target: String,

        /// URL of the page making the request
        #[arg(short, long)]
        source: Option<String>,

        /// Preferences file (activated, defaultPolicy, customRules, ...)
        #[arg(long)]
        settings: Option<String>,

        /// Rule-set file, replacing the rules from the preferences
        #[arg(short, long)]
        rules: Option<String>,

        /// Default policy, by name or code
        #[arg(short, long)]
        default_policy: Option<PolicyCode>,

        /// Compare exact hosts instead of base domains
        #[arg(long)]
        strict: bool,

        /// Decide even when the request has no referrer
        #[arg(long)]
        no_ignore_blank: bool,

        /// Decide even for same-site requests
        #[arg(long)]
        no_ignore_same: bool,
    },

    /// Parse a rule-set file and report kept and dropped rules
    Check {
        /// Rule-set file
        input: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a RefControl file into a rule set
    Convert {
        input: String,

        #[arg(short, long)]
        output: Option<String>,
    },

    /// Wrap a rule set into an exported rule file
    Export {
        input: String,

        #[arg(short, long)]
        output: Option<String>,

        #[arg(long, default_value = "Referrer Control Rules")]
        title: String,
    },

    /// Merge an import file into a rule set
    Merge {
        /// Existing rule-set file
        base: String,

        /// RefControl, exported or rule-set file to merge in
        import: String,

        #[arg(short, long)]
        output: Option<String>,
    },

    /// Measure resolution latency over a synthetic workload
    Bench {
        /// Rule-set file; synthetic rules are generated otherwise
        #[arg(short, long)]
        rules: Option<String>,

        #[arg(long, default_value_t = 100)]
        iterations: usize,

        #[arg(long, default_value_t = 200)]
        pages: usize,

        #[arg(long, default_value_t = 20)]
        reqs_per_page: usize,

        /// Number of synthetic rules when no rule file is given
        #[arg(long, default_value_t = 100)]
        synthetic_rules: usize,

        #[arg(long, default_value_t = bench::DEFAULT_SEED)]
        seed: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    Builder::from_env(Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Resolve {
            target,
            source,
            settings,
            rules,
            default_policy,
            strict,
            no_ignore_blank,
            no_ignore_same,
        } => cmd_resolve(
            cli.psl.as_deref(),
            ResolveArgs {
                target,
                source,
                settings,
                rules,
                default_policy,
                strict,
                no_ignore_blank,
                no_ignore_same,
            },
        ),
        Commands::Check { input, json } => cmd_check(&input, json),
        Commands::Convert { input, output } => cmd_convert(&input, output.as_deref()),
        Commands::Export {
            input,
            output,
            title,
        } => cmd_export(&input, output.as_deref(), &title),
        Commands::Merge {
            base,
            import,
            output,
        } => cmd_merge(&base, &import, output.as_deref()),
        Commands::Bench {
            rules,
            iterations,
            pages,
            reqs_per_page,
            synthetic_rules,
            seed,
        } => cmd_bench(
            cli.psl.as_deref(),
            rules.as_deref(),
            bench::BenchOptions {
                iterations,
                pages,
                reqs_per_page,
                synthetic_rules,
                seed,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

struct ResolveArgs {
    target: String,
    source: Option<String>,
    settings: Option<String>,
    rules: Option<String>,
    default_policy: Option<PolicyCode>,
    strict: bool,
    no_ignore_blank: bool,
    no_ignore_same: bool,
}

fn cmd_resolve(psl: Option<&str>, args: ResolveArgs) -> Result<(), String> {
    let lookup = rules::load_suffixes(psl)?;
    let mut config = rules::load_config_files(args.settings.as_deref(), args.rules.as_deref())?;

    if let Some(policy) = args.default_policy {
        config.default_policy = policy;
    }
    if args.strict {
        config.strict_same_domains = true;
    }
    if args.no_ignore_blank {
        config.ignore_blank_source = false;
    }
    if args.no_ignore_same {
        config.ignore_same_domains = false;
    }

    let target = parse_url(&args.target).ok_or_else(|| format!("Invalid target URL '{}'", args.target))?;
    let source = parse_source(args.source.as_deref());
    if args.source.is_some() && source.is_none() {
        return Err(format!("Invalid source URL '{}'", args.source.unwrap_or_default()));
    }

    let decision = Resolver::new(lookup.as_ref()).resolve_config(&config, source.as_ref(), &target);

    match decision.value.as_deref() {
        None => println!("<untouched>"),
        Some("") => println!("<empty>"),
        Some(value) => println!("{value}"),
    }

    let reason = match decision.reason {
        DecisionReason::Deactivated => "deactivated".to_string(),
        DecisionReason::BlankSource => "no referrer to replace".to_string(),
        DecisionReason::SameDomain => "same site".to_string(),
        DecisionReason::Rule(index) => {
            let rule = &config.rules[index];
            let mut text = format!(
                "rule #{} (source: {}, target: {})",
                index,
                rule.source.spec().unwrap_or("*"),
                rule.target.spec().unwrap_or("*")
            );
            if !rule.comment.is_empty() {
                text.push_str(&format!(" {}", rule.comment));
            }
            text
        }
        DecisionReason::DefaultPolicy => format!("default policy {}", config.default_policy),
    };
    eprintln!("  via {reason}");

    Ok(())
}

fn cmd_check(input: &str, json: bool) -> Result<(), String> {
    let text = rules::read_text(input)?;
    let parsed = parse_rules_with_report(&text).map_err(|e| format!("'{}': {}", input, e))?;

    if json {
        let rejected: Vec<_> = parsed
            .rejected
            .iter()
            .map(|r| serde_json::json!({ "index": r.index, "reason": r.reason.to_string() }))
            .collect();
        let report = serde_json::json!({
            "kept": parsed.rules.len(),
            "rejected": rejected,
        });
        println!("{report}");
    } else {
        println!("Rule set '{}'", input);
        println!("  Kept:      {}", parsed.rules.len());
        println!("  Dropped:   {}", parsed.rejected.len());
        for rejected in &parsed.rejected {
            println!("    #{}: {}", rejected.index, rejected.reason);
        }
    }

    Ok(())
}

fn cmd_convert(input: &str, output: Option<&str>) -> Result<(), String> {
    let text = rules::read_text(input)?;
    if !rc_compiler::refcontrol::is_refcontrol(&text) {
        return Err(format!("'{}' is not a RefControl file", input));
    }

    let converted = import_rule_file(&text).map_err(|e| format!("'{}': {}", input, e))?;
    let json = serialize_rules(&converted).map_err(|e| e.to_string())?;
    rules::write_text(output, &json)?;

    log::info!("converted {} rule(s) from '{}'", converted.len(), input);
    Ok(())
}

fn cmd_export(input: &str, output: Option<&str>, title: &str) -> Result<(), String> {
    let exported = parse_rules(&rules::read_text(input)?).map_err(|e| format!("'{}': {}", input, e))?;
    let date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let document = build_rule_file(&exported, title, &date).map_err(|e| e.to_string())?;
    rules::write_text(output, &document)
}

fn cmd_merge(base: &str, import: &str, output: Option<&str>) -> Result<(), String> {
    let mut existing = parse_rules(&rules::read_text(base)?).map_err(|e| format!("'{}': {}", base, e))?;
    let incoming = import_rule_file(&rules::read_text(import)?).map_err(|e| format!("'{}': {}", import, e))?;

    let stats = merge_rules(&mut existing, incoming);
    let json = serialize_rules(&existing).map_err(|e| e.to_string())?;
    rules::write_text(output, &json)?;

    eprintln!(
        "Merged '{}' into '{}': {} -> {} rules ({} updated, {} appended)",
        import, base, stats.before, stats.after, stats.updated, stats.appended
    );
    Ok(())
}

fn cmd_bench(psl: Option<&str>, rules_path: Option<&str>, opts: bench::BenchOptions) -> Result<(), String> {
    let lookup = rules::load_suffixes(psl)?;
    let config = rules::load_config_files(None, rules_path)?;
    bench::run(&config, lookup.as_ref(), opts)
}
