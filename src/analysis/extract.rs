//! Weak signal extractors.
//!
//! String heuristics that pull usernames, locations and entity kinds out of
//! collector output. They accept false positives and negatives; anything
//! smarter can replace them here without touching the aggregator.

use crate::config::ExtractionConfig;

/// What a web entity description most likely refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Person,
    Organization,
}

/// Extract the handle following `marker` in a profile URL.
///
/// `https://twitter.com/johndoe/status/1?s=20` with marker `twitter.com/`
/// yields `johndoe`.
pub fn username_from_profile_url<'a>(url: &'a str, marker: &str) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }
    let (_, rest) = url.split_once(marker)?;
    let handle = rest.split('/').next()?.split('?').next()?;
    (!handle.is_empty()).then_some(handle)
}

/// Extract candidate place names from a free-text description.
///
/// For every keyword, the text between its first and second occurrence as a
/// whole word (or to the end) is cut at the first `.`, then at the first `,`,
/// and kept if its trimmed length lies strictly between the configured bounds.
pub fn locations_from_description(description: &str, config: &ExtractionConfig) -> Vec<String> {
    let mut locations = Vec::new();

    for keyword in &config.location_keywords {
        let needle = format!(" {} ", keyword);
        let Some(after) = description.split(needle.as_str()).nth(1) else {
            continue;
        };

        let candidate = after
            .split('.')
            .next()
            .unwrap_or_default()
            .split(',')
            .next()
            .unwrap_or_default()
            .trim();

        let len = candidate.chars().count();
        if len > config.min_location_len && len < config.max_location_len {
            locations.push(candidate.to_string());
        }
    }

    locations
}

/// Classify a web entity description by keyword.
///
/// Person keywords win over organization keywords.
pub fn classify_entity(description: &str, config: &ExtractionConfig) -> Option<EntityKind> {
    let lower = description.to_lowercase();

    if contains_any(&lower, &config.person_keywords) {
        Some(EntityKind::Person)
    } else if contains_any(&lower, &config.entity_organization_keywords) {
        Some(EntityKind::Organization)
    } else {
        None
    }
}

/// Whether a website title looks like an organization name.
pub fn is_organization_title(title: &str, config: &ExtractionConfig) -> bool {
    contains_any(&title.to_lowercase(), &config.title_organization_keywords)
}

/// The part of an address before `@`, if non-empty.
pub fn email_local_part(address: &str) -> Option<&str> {
    let local = address.split('@').next()?;
    (!local.is_empty()).then_some(local)
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|kw| !kw.is_empty() && haystack.contains(kw.to_lowercase().as_str()))
}
