//! Subject aggregation.
//!
//! This module merges the loosely structured blobs returned by independent
//! collectors into one [`SubjectRecord`] and scores it.

use super::extract::{self, EntityKind};
use super::scoring;
use crate::config::{Config, ExtractionConfig, ScoringConfig};
use crate::models::{EmailEntry, ImageEntry, ProfileEntry, Source, SourceBlobs, SubjectRecord};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Reasons an aggregation call degrades to an error record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("subject name is empty")]
    EmptyName,

    #[error("{origin} blob must be a JSON object, found {found}")]
    NotAnObject { origin: Source, found: &'static str },
}

/// Merges collector blobs into scored subject records.
#[derive(Debug, Clone)]
pub struct Aggregator {
    extraction: ExtractionConfig,
    scoring: ScoringConfig,
}

impl Aggregator {
    /// Create an aggregator from the extraction and scoring settings.
    pub fn new(config: &Config) -> Self {
        Self {
            extraction: config.extraction.clone(),
            scoring: config.scoring.clone(),
        }
    }

    /// Aggregate blobs for `name`, stamping the record with the current time.
    pub fn aggregate(&self, name: &str, blobs: &SourceBlobs) -> SubjectRecord {
        self.aggregate_at(name, blobs, Utc::now())
    }

    /// Aggregate blobs for `name` with an explicit timestamp.
    ///
    /// Never fails: any error yields a record holding only the name, the
    /// error message and a confidence of 0.
    pub fn aggregate_at(
        &self,
        name: &str,
        blobs: &SourceBlobs,
        now: DateTime<Utc>,
    ) -> SubjectRecord {
        match self.try_aggregate(name, blobs, now) {
            Ok(record) => {
                info!(
                    "Aggregated data for '{}' with a confidence of {}%",
                    record.name, record.metadata.confidence
                );
                record
            }
            Err(e) => {
                error!("Aggregation failed for '{}': {}", name, e);
                SubjectRecord::failed(name, now, e.to_string())
            }
        }
    }

    /// Aggregate blobs, surfacing errors instead of degrading.
    pub fn try_aggregate(
        &self,
        name: &str,
        blobs: &SourceBlobs,
        now: DateTime<Utc>,
    ) -> Result<SubjectRecord, AggregateError> {
        if name.trim().is_empty() {
            return Err(AggregateError::EmptyName);
        }

        let social = object_blob(blobs.social.as_ref(), Source::SocialMedia)?;
        let images = object_blob(blobs.images.as_ref(), Source::ImageSearch)?;
        let emails = object_blob(blobs.emails.as_ref(), Source::EmailSearch)?;

        let mut record = SubjectRecord::new(name, now);

        if let Some(blob) = social {
            record.add_source(Source::SocialMedia);
            self.merge_social(&mut record, blob);
        }

        if let Some(blob) = images {
            record.add_source(Source::ImageSearch);
            self.merge_images(&mut record, blob);
        }

        if let Some(blob) = emails {
            record.add_source(Source::EmailSearch);
            self.merge_emails(&mut record, blob);
        }

        record.metadata.confidence = scoring::confidence(&record, &self.scoring);
        Ok(record)
    }

    fn merge_social(&self, record: &mut SubjectRecord, blob: &Map<String, Value>) {
        let Some(platforms) = blob.get("profiles").and_then(Value::as_object) else {
            warn!("Social blob has no 'profiles' object");
            return;
        };

        for (platform, profiles) in platforms {
            let Some(profiles) = profiles.as_array() else {
                debug!("Skipping platform '{}': profiles are not a list", platform);
                continue;
            };

            let marker = self.extraction.username_markers.get(platform);
            let mut entries = Vec::with_capacity(profiles.len());

            for profile in profiles.iter().filter_map(Value::as_object) {
                let entry = ProfileEntry {
                    platform: platform.clone(),
                    name: str_field(profile, "name").unwrap_or_default().to_string(),
                    url: str_field(profile, "url").unwrap_or_default().to_string(),
                    description: str_field(profile, "description")
                        .filter(|d| !d.is_empty())
                        .map(str::to_string),
                };

                if let Some(marker) = marker {
                    if let Some(handle) = extract::username_from_profile_url(&entry.url, marker) {
                        record.possible_usernames.insert(handle.to_string());
                    }
                }

                if let Some(ref description) = entry.description {
                    record
                        .locations
                        .extend(extract::locations_from_description(description, &self.extraction));
                }

                entries.push(entry);
            }

            record
                .social_profiles
                .entry(platform.clone())
                .or_default()
                .extend(entries);
        }
    }

    fn merge_images(&self, record: &mut SubjectRecord, blob: &Map<String, Value>) {
        for (engine, results) in blob {
            let Some(results) = results.as_object() else {
                debug!("Skipping engine '{}': results are not an object", engine);
                continue;
            };

            if contains(&self.extraction.entity_engines, engine) {
                for entity in list_field(results, "web_entities").filter_map(Value::as_object) {
                    let description = str_field(entity, "description").unwrap_or_default();
                    let score = entity.get("score").and_then(Value::as_f64).unwrap_or(0.0);

                    if description.is_empty() || score <= self.extraction.entity_score_threshold {
                        continue;
                    }

                    match extract::classify_entity(description, &self.extraction) {
                        Some(EntityKind::Person) => {
                            record.add_alias(description);
                        }
                        Some(EntityKind::Organization) => {
                            record.organizations.insert(description.to_string());
                        }
                        None => {}
                    }
                }
            }

            if contains(&self.extraction.image_engines, engine) {
                for image in list_field(results, "similar_images").filter_map(Value::as_object) {
                    if let Some(url) = str_field(image, "url") {
                        record.images.push(ImageEntry {
                            url: url.to_string(),
                            source: engine.clone(),
                            page_url: str_field(image, "page_url").map(str::to_string),
                        });
                    }
                }
            }

            if contains(&self.extraction.best_guess_engines, engine) {
                if let Some(best_guess) = str_field(results, "best_guess") {
                    record.add_alias(best_guess);
                }
            }

            if contains(&self.extraction.website_engines, engine) {
                for website in list_field(results, "websites").filter_map(Value::as_object) {
                    if let Some(title) = str_field(website, "title") {
                        if extract::is_organization_title(title, &self.extraction) {
                            record.organizations.insert(title.to_string());
                        }
                    }
                }
            }
        }
    }

    fn merge_emails(&self, record: &mut SubjectRecord, blob: &Map<String, Value>) {
        for email in list_field(blob, "emails").filter_map(Value::as_object) {
            let Some(address) = str_field(email, "value") else {
                continue;
            };

            let confidence = email
                .get("confidence")
                .and_then(Value::as_f64)
                .map(clamp_percent)
                .unwrap_or(0);

            record.emails.push(EmailEntry {
                address: address.to_string(),
                confidence,
                source: self.extraction.email_source.clone(),
            });

            if let Some(local) = extract::email_local_part(address) {
                record.possible_usernames.insert(local.to_string());
            }
        }

        if let Some(organization) = str_field(blob, "organization").filter(|o| !o.is_empty()) {
            record.organizations.insert(organization.to_string());
        }
    }
}

/// View a blob as a non-empty object.
///
/// Absent, `null` and `{}` blobs carry nothing; any other non-object root is
/// an error.
fn object_blob(
    blob: Option<&Value>,
    origin: Source,
) -> Result<Option<&Map<String, Value>>, AggregateError> {
    match blob {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(AggregateError::NotAnObject {
            origin,
            found: json_kind(other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn str_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

fn list_field<'a>(object: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Value> {
    object
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn contains(list: &[String], item: &str) -> bool {
    list.iter().any(|candidate| candidate == item)
}

fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}
