//! Combination and discovery data structures.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifiers of every combination already reported.
pub type SeenSet = HashSet<String>;

/// One (city, category) pair under evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    pub city: String,
    pub category: String,
}

impl Combination {
    pub fn new(city: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            category: category.into(),
        }
    }

    /// Stable identity key stored in the seen-set (`<city>-<category>`).
    pub fn id(&self) -> String {
        format!("{}-{}", self.city, self.category)
    }

    /// Listing page URL under the given base (`<base>/<category>/<city>/`).
    pub fn listing_url(&self, base: &str) -> String {
        format!(
            "{}/{}/{}/",
            base.trim_end_matches('/'),
            self.category,
            self.city
        )
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.city, self.category)
    }
}

/// Probe verdict for a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Live,
    Absent,
}

impl Liveness {
    pub fn is_live(self) -> bool {
        matches!(self, Liveness::Live)
    }
}

/// A newly discovered live combination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryEntry {
    /// City slug
    pub city: String,

    /// Category slug
    pub category: String,

    /// Probed listing URL
    pub url: String,
}

impl DiscoveryEntry {
    pub fn new(combination: &Combination, url: impl Into<String>) -> Self {
        Self {
            city: combination.city.clone(),
            category: combination.category.clone(),
            url: url.into(),
        }
    }

    /// Heading line used in reports.
    pub fn heading(&self) -> String {
        format!("{} - {}", self.city, self.category)
    }

    /// The city/category pair this entry was found for.
    pub fn combination(&self) -> Combination {
        Combination::new(self.city.as_str(), self.category.as_str())
    }

    /// Identity key of the underlying combination.
    pub fn id(&self) -> String {
        self.combination().id()
    }
}
