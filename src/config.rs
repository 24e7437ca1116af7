//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.osint-aggregator.toml` files. The aggregator and the renderer receive
//! the resulting [`Config`] explicitly; nothing here is global.

use crate::analysis::scoring::{self, CategoryWeight};
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".osint-aggregator.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Confidence score weights.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Heuristics used to pull weak signals out of blobs.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

/// Per-category weights of the confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_social_profiles")]
    pub social_profiles: CategoryWeight,
    #[serde(default = "default_images")]
    pub images: CategoryWeight,
    #[serde(default = "default_emails")]
    pub emails: CategoryWeight,
    #[serde(default = "default_locations")]
    pub locations: CategoryWeight,
    #[serde(default = "default_usernames")]
    pub usernames: CategoryWeight,
    #[serde(default = "default_organizations")]
    pub organizations: CategoryWeight,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            social_profiles: scoring::SOCIAL_PROFILES,
            images: scoring::IMAGES,
            emails: scoring::EMAILS,
            locations: scoring::LOCATIONS,
            usernames: scoring::USERNAMES,
            organizations: scoring::ORGANIZATIONS,
        }
    }
}

fn default_social_profiles() -> CategoryWeight {
    scoring::SOCIAL_PROFILES
}

fn default_images() -> CategoryWeight {
    scoring::IMAGES
}

fn default_emails() -> CategoryWeight {
    scoring::EMAILS
}

fn default_locations() -> CategoryWeight {
    scoring::LOCATIONS
}

fn default_usernames() -> CategoryWeight {
    scoring::USERNAMES
}

fn default_organizations() -> CategoryWeight {
    scoring::ORGANIZATIONS
}

/// Keyword lists and thresholds for the weak extractors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Words that introduce a place in a profile description.
    #[serde(default = "default_location_keywords")]
    pub location_keywords: Vec<String>,

    /// Extracted locations must be strictly longer than this (in chars).
    #[serde(default = "default_min_location_len")]
    pub min_location_len: usize,

    /// Extracted locations must be strictly shorter than this (in chars).
    #[serde(default = "default_max_location_len")]
    pub max_location_len: usize,

    /// Web entities must score strictly above this to be used.
    #[serde(default = "default_entity_score_threshold")]
    pub entity_score_threshold: f64,

    /// Substrings marking a web entity as a person.
    #[serde(default = "default_person_keywords")]
    pub person_keywords: Vec<String>,

    /// Substrings marking a web entity as an organization.
    #[serde(default = "default_entity_organization_keywords")]
    pub entity_organization_keywords: Vec<String>,

    /// Substrings marking a website title as an organization.
    #[serde(default = "default_title_organization_keywords")]
    pub title_organization_keywords: Vec<String>,

    /// Platform key to the URL marker preceding the handle.
    #[serde(default = "default_username_markers")]
    pub username_markers: BTreeMap<String, String>,

    /// Engines whose `web_entities` are classified.
    #[serde(default = "default_entity_engines")]
    pub entity_engines: Vec<String>,

    /// Engines whose `similar_images` are collected.
    #[serde(default = "default_image_engines")]
    pub image_engines: Vec<String>,

    /// Engines whose `best_guess` label is kept as an alias.
    #[serde(default = "default_best_guess_engines")]
    pub best_guess_engines: Vec<String>,

    /// Engines whose `websites` titles are scanned for organizations.
    #[serde(default = "default_website_engines")]
    pub website_engines: Vec<String>,

    /// Source label attached to every discovered email.
    #[serde(default = "default_email_source")]
    pub email_source: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            location_keywords: default_location_keywords(),
            min_location_len: default_min_location_len(),
            max_location_len: default_max_location_len(),
            entity_score_threshold: default_entity_score_threshold(),
            person_keywords: default_person_keywords(),
            entity_organization_keywords: default_entity_organization_keywords(),
            title_organization_keywords: default_title_organization_keywords(),
            username_markers: default_username_markers(),
            entity_engines: default_entity_engines(),
            image_engines: default_image_engines(),
            best_guess_engines: default_best_guess_engines(),
            website_engines: default_website_engines(),
            email_source: default_email_source(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_location_keywords() -> Vec<String> {
    strings(&["à", "in", "from", "located", "based"])
}

fn default_min_location_len() -> usize {
    2
}

fn default_max_location_len() -> usize {
    30
}

fn default_entity_score_threshold() -> f64 {
    0.7
}

fn default_person_keywords() -> Vec<String> {
    strings(&["person", "people", "celebrity"])
}

fn default_entity_organization_keywords() -> Vec<String> {
    strings(&["company", "corporation", "organization", "corp"])
}

fn default_title_organization_keywords() -> Vec<String> {
    strings(&["company", "inc", "ltd", "corporation", "corp", "group"])
}

fn default_username_markers() -> BTreeMap<String, String> {
    [("twitter", "twitter.com/"), ("instagram", "instagram.com/")]
        .into_iter()
        .map(|(platform, marker)| (platform.to_string(), marker.to_string()))
        .collect()
}

fn default_entity_engines() -> Vec<String> {
    strings(&["google_api"])
}

fn default_image_engines() -> Vec<String> {
    strings(&["google", "yandex", "tineye"])
}

fn default_best_guess_engines() -> Vec<String> {
    strings(&["google"])
}

fn default_website_engines() -> Vec<String> {
    strings(&["google", "yandex"])
}

fn default_email_source() -> String {
    "hunter.io".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum images shown in the gallery.
    #[serde(default = "default_gallery_limit")]
    pub gallery_limit: usize,

    /// Embed the relationship graph.
    #[serde(default = "default_true")]
    pub include_graph: bool,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            gallery_limit: default_gallery_limit(),
            include_graph: true,
            format: OutputFormat::default(),
        }
    }
}

fn default_gallery_limit() -> usize {
    12
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when the CLI provides an explicit value.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.output_dir {
            self.general.output_dir = dir.clone();
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }

        if args.no_graph {
            self.report.include_graph = false;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output_dir, PathBuf::from("reports"));
        assert_eq!(config.report.gallery_limit, 12);
        assert!(config.report.include_graph);
        assert_eq!(config.extraction.entity_score_threshold, 0.7);
        assert_eq!(
            config.extraction.username_markers.get("twitter"),
            Some(&"twitter.com/".to_string())
        );
        assert_eq!(config.scoring.emails, scoring::EMAILS);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_dir = "out"
verbose = true

[scoring.emails]
weight = 30.0
saturation = 2

[extraction]
location_keywords = ["in", "near"]

[report]
gallery_limit = 6
format = "json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, PathBuf::from("out"));
        assert!(config.general.verbose);
        assert_eq!(config.scoring.emails.weight, 30.0);
        assert_eq!(config.scoring.emails.saturation, 2);
        assert_eq!(config.scoring.images, scoring::IMAGES);
        assert_eq!(config.extraction.location_keywords, vec!["in", "near"]);
        assert_eq!(config.extraction.email_source, "hunter.io");
        assert_eq!(config.report.gallery_limit, 6);
        assert_eq!(config.report.format, OutputFormat::Json);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[extraction]"));
        assert!(toml_str.contains("[report]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.scoring, ScoringConfig::default());
    }
}
