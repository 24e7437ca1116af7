//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// osint-aggregator - merge OSINT collector results into scored reports
///
/// Combines social media, reverse image search and email lookup results
/// about one subject into a single record with a confidence score, then
/// writes an HTML (or JSON) report with a relationship graph.
///
/// Examples:
///   osint-aggregator --name "John Doe" --social social.json --emails emails.json
///   osint-aggregator --case cases/john_doe.json --format json
///   osint-aggregator --batch cases/ --fail-under 40
///   osint-aggregator --case cases/john_doe.json --dry-run
///   osint-aggregator --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Name of the investigated subject
    #[arg(
        short,
        long,
        value_name = "NAME",
        required_unless_present_any = ["case", "batch", "init_config"]
    )]
    pub name: Option<String>,

    /// Social media collector result (JSON file)
    #[arg(long, value_name = "FILE", requires = "name")]
    pub social: Option<PathBuf>,

    /// Reverse image search result (JSON file)
    #[arg(long, value_name = "FILE", requires = "name")]
    pub images: Option<PathBuf>,

    /// Email lookup result (JSON file)
    #[arg(long, value_name = "FILE", requires = "name")]
    pub emails: Option<PathBuf>,

    /// Case bundle holding the name and all three blobs (JSON file)
    #[arg(long, value_name = "FILE", conflicts_with_all = ["name", "batch"])]
    pub case: Option<PathBuf>,

    /// Directory of case bundles; every *.json file is one subject
    #[arg(long, value_name = "DIR", conflicts_with = "name")]
    pub batch: Option<PathBuf>,

    /// Directory reports are written to
    ///
    /// Defaults to `reports`, or the value from .osint-aggregator.toml.
    #[arg(short, long, value_name = "DIR", env = "OSINT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format (html, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .osint-aggregator.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Leave the relationship graph out of HTML reports
    #[arg(long)]
    pub no_graph: bool,

    /// Fail if any subject scores below this confidence
    ///
    /// Useful for pipelines. Exit code 2 when a subject falls short.
    #[arg(long, value_name = "SCORE")]
    pub fail_under: Option<u8>,

    /// Dry run: aggregate and print the summary without writing reports
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .osint-aggregator.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Self-contained HTML page (default)
    #[default]
    Html,
    /// Pretty-printed JSON record
    Json,
}

impl OutputFormat {
    /// File extension of reports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether a batch directory was given.
    pub fn is_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                return Err("Subject name must not be empty".to_string());
            }
        }

        if let Some(score) = self.fail_under {
            if score > 100 {
                return Err("--fail-under must be between 0 and 100".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        for (flag, path) in [
            ("--social", &self.social),
            ("--images", &self.images),
            ("--emails", &self.emails),
            ("--case", &self.case),
        ] {
            if let Some(path) = path {
                if !path.is_file() {
                    return Err(format!("{} file does not exist: {}", flag, path.display()));
                }
            }
        }

        if let Some(ref dir) = self.batch {
            if !dir.exists() {
                return Err(format!("Batch directory does not exist: {}", dir.display()));
            }
            if !dir.is_dir() {
                return Err(format!("Batch path is not a directory: {}", dir.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            name: Some("John Doe".to_string()),
            social: None,
            images: None,
            emails: None,
            case: None,
            batch: None,
            output_dir: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            no_graph: false,
            fail_under: None,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_single_mode() {
        let args = Args::try_parse_from([
            "osint-aggregator",
            "--name",
            "John Doe",
            "--format",
            "json",
            "--fail-under",
            "40",
            "--no-graph",
        ])
        .unwrap();

        assert_eq!(args.name.as_deref(), Some("John Doe"));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.fail_under, Some(40));
        assert!(args.no_graph);
        assert!(!args.is_batch());
    }

    #[test]
    fn test_name_required_without_case_or_batch() {
        assert!(Args::try_parse_from(["osint-aggregator"]).is_err());
        assert!(Args::try_parse_from(["osint-aggregator", "--init-config"]).is_ok());
        assert!(Args::try_parse_from(["osint-aggregator", "--batch", "cases"]).is_ok());
    }

    #[test]
    fn test_case_conflicts_with_name() {
        let result = Args::try_parse_from([
            "osint-aggregator",
            "--name",
            "John",
            "--case",
            "john.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_blank_name() {
        let mut args = make_args();
        args.name = Some("   ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_fail_under_range() {
        let mut args = make_args();
        args.fail_under = Some(101);
        assert!(args.validate().is_err());

        args.fail_under = Some(100);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_blob_file() {
        let mut args = make_args();
        args.social = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_batch_must_be_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut args = make_args();
        args.name = None;
        args.batch = Some(file.path().to_path_buf());
        assert!(args.validate().is_err());

        let dir = tempfile::tempdir().unwrap();
        args.batch = Some(dir.path().to_path_buf());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Html.extension(), "html");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }
}
