use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use valuation_core::{serde_utils, ValuationConfig};
use valuation_rules::{
    load_snapshot, ListingContext, RulesetSnapshot, ValidationLimits, ValuationEngine,
};

mod report;

use report::{print_breakdown, print_validation_summary};

#[derive(Parser)]
#[command(name = "valuation")]
#[command(about = "Validate pricing rulesets and value listings against them", long_about = None)]
struct Cli {
    /// Rules file or directory (defaults to VALUATION_RULES_PATH)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate rulesets without evaluating anything
    Validate,
    /// Value a single listing and print its breakdown
    Evaluate(EvaluateArgs),
    /// Value every listing in a JSON array, one JSON result per line
    Batch(BatchArgs),
    /// Show version information
    Version,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Listing JSON document
    #[arg(long)]
    listing: PathBuf,
    /// Only evaluate this ruleset
    #[arg(long)]
    ruleset: Option<String>,
    /// Print the breakdown blob as JSON instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// JSON array of listing documents
    #[arg(long)]
    listings: PathBuf,
    /// Only evaluate this ruleset
    #[arg(long)]
    ruleset: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ValuationConfig::from_env().context("invalid VALUATION_* configuration")?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    valuation_core::init_tracing(Some(level))?;

    run(cli, &config)
}

fn run(cli: Cli, config: &ValuationConfig) -> Result<()> {
    let Cli { rules, command, .. } = cli;
    let rules_path = || {
        rules
            .clone()
            .or_else(|| config.rules_path.clone())
            .context("no rules path given; pass --rules or set VALUATION_RULES_PATH")
    };
    let engine = ValuationEngine::from_config(config);

    match command {
        Commands::Version => {
            println!("valuation v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate => {
            let snapshot = load_rules(&rules_path()?, config)?;
            print_validation_summary(&snapshot, engine.policy());
        }
        Commands::Evaluate(args) => {
            let snapshot = load_rules(&rules_path()?, config)?;
            let listing: ListingContext = read_json(&args.listing)?;
            let result = engine.evaluate_listing(&listing, &snapshot, args.ruleset.as_deref());
            info!(
                listing = listing.label(),
                total_adjustment_usd = %result.total_adjustment_usd,
                adjusted_price_usd = %result.adjusted_price_usd,
                "listing valued"
            );
            if args.json {
                println!("{}", result.to_json()?);
            } else {
                print_breakdown(&result);
            }
        }
        Commands::Batch(args) => {
            let snapshot = load_rules(&rules_path()?, config)?;
            let listings: Vec<ListingContext> = read_json(&args.listings)?;
            let results = engine.evaluate_batch(&listings, &snapshot, args.ruleset.as_deref());
            info!(
                listings = results.len(),
                parallel = engine.is_parallel(),
                "batch valued"
            );
            for result in &results {
                println!("{}", serde_utils::to_json_line(result)?);
            }
        }
    }

    Ok(())
}

fn load_rules(path: &Path, config: &ValuationConfig) -> Result<RulesetSnapshot> {
    let snapshot = load_snapshot(path, &ValidationLimits::from(config))
        .with_context(|| format!("failed to load rulesets from {}", path.display()))?;
    if snapshot.is_empty() {
        bail!("no rulesets found in {}", path.display());
    }
    Ok(snapshot)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_utils::from_json_bytes(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_evaluate_arguments() {
        let cli = Cli::try_parse_from([
            "valuation",
            "--rules",
            "rules/",
            "evaluate",
            "--listing",
            "listing.json",
            "--ruleset",
            "standard",
            "--json",
        ])
        .expect("parse");

        assert_eq!(cli.rules, Some(PathBuf::from("rules/")));
        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.ruleset.as_deref(), Some("standard"));
                assert!(args.json);
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn evaluate_requires_listing() {
        assert!(Cli::try_parse_from(["valuation", "evaluate"]).is_err());
    }

    #[test]
    fn missing_rules_path_is_an_error() {
        let cli = Cli::try_parse_from(["valuation", "validate"]).expect("parse");
        let err = run(cli, &ValuationConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no rules path"));
    }

    #[test]
    fn reads_listing_documents() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"[{{"base_price_usd": "100", "fields": {{"ram_gb": 16}}}}]"#
        )
        .expect("write");

        let listings: Vec<ListingContext> = read_json(file.path()).expect("listings");
        assert_eq!(listings.len(), 1);
        assert!(listings[0].field("ram_gb").is_some());
    }
}
