//! Data models for the OSINT aggregator.
//!
//! This module contains the subject record produced by the aggregator and
//! the entry types it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A collector source that contributed data to a subject record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Social-media profile scrapers.
    SocialMedia,
    /// Reverse image search engines.
    ImageSearch,
    /// Email discovery services.
    EmailSearch,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::SocialMedia => write!(f, "social_media"),
            Source::ImageSearch => write!(f, "image_search"),
            Source::EmailSearch => write!(f, "email_search"),
        }
    }
}

/// Coarse bucket of a 0-100 confidence value, used for report badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    /// Band of a subject-level confidence score.
    pub fn for_subject(confidence: u8) -> Self {
        match confidence {
            c if c > 70 => ConfidenceBand::High,
            c if c > 40 => ConfidenceBand::Medium,
            _ => ConfidenceBand::Low,
        }
    }

    /// Band of a single email's confidence, which uses stricter cut-offs.
    pub fn for_email(confidence: u8) -> Self {
        match confidence {
            c if c > 80 => ConfidenceBand::High,
            c if c > 50 => ConfidenceBand::Medium,
            _ => ConfidenceBand::Low,
        }
    }

    /// Badge background color.
    pub fn color(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "#4CAF50",
            ConfidenceBand::Medium => "#FF9800",
            ConfidenceBand::Low => "#F44336",
        }
    }

    /// Emoji used in terminal summaries.
    pub fn emoji(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "🟢",
            ConfidenceBand::Medium => "🟡",
            ConfidenceBand::Low => "🔴",
        }
    }
}

/// A profile found on a social platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    /// Platform key the profile was reported under.
    pub platform: String,
    /// Display name shown on the profile.
    pub name: String,
    /// Profile URL.
    pub url: String,
    /// Free-text bio or description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An image returned by a reverse image search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub url: String,
    /// Engine that returned the image.
    pub source: String,
    /// Page the image was found on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

/// A discovered email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailEntry {
    pub address: String,
    /// Provider confidence, 0-100.
    pub confidence: u8,
    /// Label of the service that reported the address.
    pub source: String,
}

/// Provenance and score of a subject record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Sources that contributed, each at most once.
    pub sources: Vec<Source>,
    /// Overall confidence, 0-100.
    pub confidence: u8,
}

/// Everything known about one investigated subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub name: String,
    pub updated_at: DateTime<Utc>,
    /// Profiles keyed by platform.
    pub social_profiles: BTreeMap<String, Vec<ProfileEntry>>,
    pub images: Vec<ImageEntry>,
    pub emails: Vec<EmailEntry>,
    pub locations: BTreeSet<String>,
    pub possible_usernames: BTreeSet<String>,
    pub possible_aliases: BTreeSet<String>,
    pub organizations: BTreeSet<String>,
    pub metadata: RecordMetadata,
    /// Set only when aggregation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubjectRecord {
    /// Creates an empty record for the given subject.
    pub fn new(name: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            updated_at,
            social_profiles: BTreeMap::new(),
            images: Vec::new(),
            emails: Vec::new(),
            locations: BTreeSet::new(),
            possible_usernames: BTreeSet::new(),
            possible_aliases: BTreeSet::new(),
            organizations: BTreeSet::new(),
            metadata: RecordMetadata::default(),
            error: None,
        }
    }

    /// Creates the minimal record returned when aggregation fails.
    pub fn failed(name: impl Into<String>, updated_at: DateTime<Utc>, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(name, updated_at)
        }
    }

    /// Whether this is a degraded error record.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Adds a source tag unless it is already present.
    pub fn add_source(&mut self, source: Source) {
        if !self.metadata.sources.contains(&source) {
            self.metadata.sources.push(source);
        }
    }

    /// Adds an alias unless it names the subject itself.
    ///
    /// Returns whether the alias was inserted.
    pub fn add_alias(&mut self, alias: &str) -> bool {
        if alias.is_empty() || alias.to_lowercase() == self.name.to_lowercase() {
            return false;
        }
        self.possible_aliases.insert(alias.to_string())
    }

    /// Number of platforms reported, including those without profiles.
    pub fn platform_count(&self) -> usize {
        self.social_profiles.len()
    }

    /// Total number of profiles across all platforms.
    pub fn profile_count(&self) -> usize {
        self.social_profiles.values().map(Vec::len).sum()
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::for_subject(self.metadata.confidence)
    }

    /// Copy of the record with the timestamp zeroed, for comparisons that
    /// must ignore when the record was built.
    #[cfg(test)]
    pub fn without_timestamp(&self) -> Self {
        Self {
            updated_at: DateTime::<Utc>::default(),
            ..self.clone()
        }
    }
}

/// Raw collector output for one subject.
///
/// Blobs are kept as loose JSON; the aggregator reads them defensively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceBlobs {
    /// Social scraper output: `{ "profiles": { <platform>: [ ... ] } }`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<serde_json::Value>,
    /// Reverse image search output keyed by engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<serde_json::Value>,
    /// Email finder output: `{ "emails": [ ... ], "organization": ... }`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<serde_json::Value>,
}

/// A subject name together with its blobs, as stored in one case file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseBundle {
    pub name: String,
    #[serde(flatten)]
    pub blobs: SourceBlobs,
}
