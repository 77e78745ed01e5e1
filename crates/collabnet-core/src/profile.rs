//! Developer profile and country-type classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ProfileThresholds;

/// Activity-based developer classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeveloperProfile {
    #[serde(rename = "Core Developer")]
    Core,
    #[serde(rename = "Peripheral Developer")]
    Peripheral,
    #[serde(rename = "One-time Contributor or Newcomer")]
    Newcomer,
}

impl DeveloperProfile {
    /// Classify from aggregated activity totals.
    ///
    /// `prs` is opened plus merged pull requests.
    #[must_use]
    pub const fn classify(prs: u64, commits: u64, reviews: u64, t: &ProfileThresholds) -> Self {
        if prs >= t.core_prs || commits >= t.core_commits || reviews >= t.core_reviews {
            Self::Core
        } else if prs >= t.peripheral_prs
            || commits >= t.peripheral_commits
            || reviews >= t.peripheral_reviews
        {
            Self::Peripheral
        } else {
            Self::Newcomer
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Core => "Core Developer",
            Self::Peripheral => "Peripheral Developer",
            Self::Newcomer => "One-time Contributor or Newcomer",
        }
    }
}

impl fmt::Display for DeveloperProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Economic grouping of a developer's country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryType {
    Emerging,
    Developed,
}

const EMERGING_COUNTRIES: &[&str] = &[
    "brazil",
    "india",
    "china",
    "south africa",
    "russia",
    "mexico",
    "indonesia",
    "turkey",
    "thailand",
    "malaysia",
    "philippines",
    "vietnam",
    "argentina",
    "colombia",
    "chile",
    "peru",
    "ukraine",
    "romania",
    "bulgaria",
    "croatia",
    "poland",
    "czech republic",
    "hungary",
    "egypt",
    "nigeria",
    "kenya",
    "ghana",
];

impl CountryType {
    /// Case-insensitive lookup; anything not on the emerging list is developed.
    #[must_use]
    pub fn classify(country: &str) -> Self {
        let lowered = country.trim().to_lowercase();
        if EMERGING_COUNTRIES.contains(&lowered.as_str()) {
            Self::Emerging
        } else {
            Self::Developed
        }
    }
}

impl fmt::Display for CountryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emerging => f.write_str("emerging"),
            Self::Developed => f.write_str("developed"),
        }
    }
}
