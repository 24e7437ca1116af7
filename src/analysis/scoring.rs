//! Confidence scoring.
//!
//! The score is a weighted sum over six categories. Each category earns
//! `weight * min(count, saturation) / saturation` points, so it is capped at
//! its weight once `saturation` items are found. The total is rounded
//! half-to-even and clamped to 100.

use crate::config::ScoringConfig;
use crate::models::SubjectRecord;
use serde::{Deserialize, Serialize};

/// Maximum points of a category and the count at which they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub weight: f64,
    pub saturation: usize,
}

impl CategoryWeight {
    pub const fn new(weight: f64, saturation: usize) -> Self {
        Self { weight, saturation }
    }

    /// Points earned for `count` items.
    pub fn contribution(&self, count: usize) -> f64 {
        if self.saturation == 0 || count == 0 {
            return 0.0;
        }
        self.weight * count.min(self.saturation) as f64 / self.saturation as f64
    }
}

pub const SOCIAL_PROFILES: CategoryWeight = CategoryWeight::new(20.0, 5);
pub const IMAGES: CategoryWeight = CategoryWeight::new(15.0, 10);
pub const EMAILS: CategoryWeight = CategoryWeight::new(25.0, 3);
pub const LOCATIONS: CategoryWeight = CategoryWeight::new(15.0, 3);
pub const USERNAMES: CategoryWeight = CategoryWeight::new(15.0, 5);
pub const ORGANIZATIONS: CategoryWeight = CategoryWeight::new(10.0, 3);

/// Upper bound of the final score.
pub const MAX_CONFIDENCE: u8 = 100;

/// Item counts per scored category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    /// Platform keys, empty ones included.
    pub platforms: usize,
    pub images: usize,
    pub emails: usize,
    pub locations: usize,
    pub usernames: usize,
    pub organizations: usize,
}

impl CategoryCounts {
    pub fn from_record(record: &SubjectRecord) -> Self {
        Self {
            platforms: record.platform_count(),
            images: record.images.len(),
            emails: record.emails.len(),
            locations: record.locations.len(),
            usernames: record.possible_usernames.len(),
            organizations: record.organizations.len(),
        }
    }
}

/// Points earned by each category before rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub social_profiles: f64,
    pub images: f64,
    pub emails: f64,
    pub locations: f64,
    pub usernames: f64,
    pub organizations: f64,
}

impl ScoreBreakdown {
    pub fn compute(counts: &CategoryCounts, weights: &ScoringConfig) -> Self {
        Self {
            social_profiles: weights.social_profiles.contribution(counts.platforms),
            images: weights.images.contribution(counts.images),
            emails: weights.emails.contribution(counts.emails),
            locations: weights.locations.contribution(counts.locations),
            usernames: weights.usernames.contribution(counts.usernames),
            organizations: weights.organizations.contribution(counts.organizations),
        }
    }

    /// Unrounded sum of all categories.
    pub fn total(&self) -> f64 {
        self.social_profiles
            + self.images
            + self.emails
            + self.locations
            + self.usernames
            + self.organizations
    }

    /// Final integer score.
    pub fn confidence(&self) -> u8 {
        let total = self.total();
        if !total.is_finite() || total <= 0.0 {
            return 0;
        }
        total.round_ties_even().min(MAX_CONFIDENCE as f64) as u8
    }
}

/// Score a record with the given weights.
pub fn confidence(record: &SubjectRecord, weights: &ScoringConfig) -> u8 {
    ScoreBreakdown::compute(&CategoryCounts::from_record(record), weights).confidence()
}
