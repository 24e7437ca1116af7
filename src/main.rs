//! osint-aggregator - OSINT result aggregation and reporting
//!
//! A CLI tool that merges the output of social media, reverse image search
//! and email lookup collectors into one scored record per subject, and
//! renders it as an HTML report with a relationship graph.
//!
//! Exit codes:
//!   0 - Success (every subject at or above --fail-under, or no threshold set)
//!   1 - Runtime error (config, unreadable input, report write failure, etc.)
//!   2 - A subject scored below the --fail-under threshold

mod analysis;
mod cases;
mod cli;
mod config;
mod graph;
mod models;
mod report;

use analysis::scoring::CategoryCounts;
use analysis::Aggregator;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::{CaseBundle, SubjectRecord};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args)?;

    info!("osint-aggregator v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Aggregation failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .osint-aggregator.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize scoring weights, keywords, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) -> Result<()> {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Outcome of processing one subject.
enum Outcome {
    Done(SubjectRecord),
    Failed,
}

/// Run the complete workflow. Returns the exit code.
fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let aggregator = Aggregator::new(&config);

    let outcomes = if let Some(ref dir) = args.batch {
        run_batch(&args, &config, &aggregator, dir)?
    } else {
        let case = load_single_case(&args)?;
        vec![process_case(&args, &config, &aggregator, &case)]
    };

    let records: Vec<&SubjectRecord> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Outcome::Done(record) => Some(record),
            Outcome::Failed => None,
        })
        .collect();
    let failures = outcomes.len() - records.len();

    if args.is_batch() {
        println!("\n📊 Batch Summary:");
        println!("   Subjects processed: {}", records.len());
        println!("   Failures: {}", failures);
        println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    }

    if failures > 0 {
        eprintln!("\n❌ {} subject(s) could not be processed.", failures);
        return Ok(1);
    }

    // Check --fail-under threshold
    if let Some(threshold) = args.fail_under {
        let below: Vec<&str> = records
            .iter()
            .filter(|record| record.metadata.confidence < threshold)
            .map(|record| record.name.as_str())
            .collect();

        if !below.is_empty() {
            eprintln!(
                "\n⛔ Confidence below {}% for: {}. Failing (exit code 2).",
                threshold,
                below.join(", ")
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Process every case bundle of a batch directory.
///
/// A case that fails to load or report is counted and skipped.
fn run_batch(
    args: &Args,
    config: &Config,
    aggregator: &Aggregator,
    dir: &Path,
) -> Result<Vec<Outcome>> {
    let files = cases::CaseScanner::new(dir.to_path_buf()).scan()?;

    if files.is_empty() {
        println!("   No case bundles found in {}", dir.display());
        return Ok(Vec::new());
    }

    println!("📂 Found {} case bundle(s) in {}", files.len(), dir.display());

    let progress_bar = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    };

    let mut outcomes = Vec::with_capacity(files.len());
    for file in &files {
        progress_bar.set_message(file.path.display().to_string());
        debug!("Loading {} ({} bytes)", file.path.display(), file.size);

        let outcome = match cases::load_case(&file.path) {
            Ok(case) => progress_bar.suspend(|| process_case(args, config, aggregator, &case)),
            Err(e) => {
                warn!("Skipping case: {:#}", e);
                Outcome::Failed
            }
        };
        outcomes.push(outcome);
        progress_bar.inc(1);
    }
    progress_bar.finish_and_clear();

    Ok(outcomes)
}

/// Build the single case from --case or from --name and the blob files.
fn load_single_case(args: &Args) -> Result<CaseBundle> {
    if let Some(ref path) = args.case {
        info!("Loading case bundle: {}", path.display());
        return cases::load_case(path);
    }

    let name = args
        .name
        .clone()
        .context("--name is required without --case or --batch")?;

    let blobs = cases::load_blobs(
        args.social.as_deref(),
        args.images.as_deref(),
        args.emails.as_deref(),
    )?;

    Ok(CaseBundle { name, blobs })
}

/// Aggregate one case, print its summary and write its report.
fn process_case(
    args: &Args,
    config: &Config,
    aggregator: &Aggregator,
    case: &CaseBundle,
) -> Outcome {
    println!("\n🔎 Aggregating data for: {}", case.name);
    let record = aggregator.aggregate(&case.name, &case.blobs);
    print_summary(&record);

    if args.dry_run {
        println!("   Dry run: no report written.");
        return Outcome::Done(record);
    }

    let output = report::write_report(&record, config, Utc::now());
    if !output.is_written() {
        eprintln!("   ❌ Report for '{}' could not be written.", record.name);
        debug!("Error document: {}", output.content);
        return Outcome::Failed;
    }

    if let Some(ref path) = output.path {
        println!(
            "   ✅ Report saved to: {} ({} bytes)",
            path.display(),
            output.content.len()
        );
    }
    Outcome::Done(record)
}

/// Print the per-subject summary.
fn print_summary(record: &SubjectRecord) {
    let counts = CategoryCounts::from_record(record);
    let band = record.confidence_band();

    if let Some(ref message) = record.error {
        println!("   ⚠️  Aggregation error: {}", message);
    }

    println!(
        "   {} Confidence: {}%",
        band.emoji(),
        record.metadata.confidence
    );
    println!(
        "   Profiles: {} on {} platform(s) | Images: {} | Emails: {}",
        record.profile_count(),
        counts.platforms,
        counts.images,
        counts.emails
    );
    println!(
        "   Usernames: {} | Aliases: {} | Locations: {} | Organizations: {}",
        counts.usernames,
        record.possible_aliases.len(),
        counts.locations,
        counts.organizations
    );

    let sources: Vec<String> = record
        .metadata
        .sources
        .iter()
        .map(ToString::to_string)
        .collect();
    if sources.is_empty() {
        println!("   Sources: none");
    } else {
        println!("   Sources: {}", sources.join(", "));
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
