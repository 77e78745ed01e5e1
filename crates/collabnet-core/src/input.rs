//! Input tables produced by the collection layer, and their join.
//!
//! # Tables
//!
//! - **Countries** (`repo_name, login, country, ...`): one row per
//!   (repository, contributor) assignment.
//! - **Metrics** (`login, repo_name, prs_opened, prs_merged, commits_total,
//!   reviews_submitted, avg_time_to_merge, ...`): per-developer activity.
//!
//! Extra columns are ignored. Counters that are empty or non-numeric read as
//! zero; an empty, `N/A` or non-numeric `avg_time_to_merge` reads as missing.
//!
//! # Join
//!
//! [`join_tables`] is an inner join on `login`: every country row is paired
//! with every metrics row of the same login, and `repo_name` is taken from the
//! countries table. Logins present in only one table are dropped.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{info, instrument};

use crate::error::AnalysisError;

/// One row of the contributor/country table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountryRow {
    pub repo_name: String,
    pub login: String,
    #[serde(default)]
    pub country: String,
}

/// One row of the developer metrics table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricsRow {
    pub login: String,
    #[serde(default)]
    pub repo_name: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub prs_opened: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub prs_merged: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub commits_total: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reviews_submitted: u64,
    /// Average time-to-merge in days, `None` when unknown.
    #[serde(default, deserialize_with = "lenient_float")]
    pub avg_time_to_merge: Option<f64>,
}

/// A joined (country × metrics) row for one developer.
#[derive(Debug, Clone, PartialEq)]
pub struct DeveloperRow {
    pub repo_name: String,
    pub login: String,
    pub country: String,
    pub prs_opened: u64,
    pub prs_merged: u64,
    pub commits_total: u64,
    pub reviews_submitted: u64,
    pub avg_time_to_merge: Option<f64>,
}

/// The materialized join of both input tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedTable {
    pub rows: Vec<DeveloperRow>,
}

impl JoinedTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Repository → contributor logins, in row order.
    ///
    /// Logins may repeat within a repository; graph construction deduplicates.
    #[must_use]
    pub fn repo_contributors(&self) -> BTreeMap<String, Vec<String>> {
        let mut repos: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in &self.rows {
            repos
                .entry(row.repo_name.clone())
                .or_default()
                .push(row.login.clone());
        }
        repos
    }

    /// All joined rows grouped by login, logins in sorted order.
    #[must_use]
    pub fn by_developer(&self) -> BTreeMap<&str, Vec<&DeveloperRow>> {
        let mut grouped: BTreeMap<&str, Vec<&DeveloperRow>> = BTreeMap::new();
        for row in &self.rows {
            grouped.entry(row.login.as_str()).or_default().push(row);
        }
        grouped
    }
}

/// Inner join of the two tables on `login`.
#[must_use]
pub fn join_tables(countries: &[CountryRow], metrics: &[MetricsRow]) -> JoinedTable {
    let mut metrics_by_login: HashMap<&str, Vec<&MetricsRow>> = HashMap::new();
    for row in metrics {
        metrics_by_login
            .entry(row.login.as_str())
            .or_default()
            .push(row);
    }

    let mut rows = Vec::new();
    for c in countries {
        let Some(matches) = metrics_by_login.get(c.login.as_str()) else {
            continue;
        };
        for m in matches {
            rows.push(DeveloperRow {
                repo_name: c.repo_name.clone(),
                login: c.login.clone(),
                country: c.country.clone(),
                prs_opened: m.prs_opened,
                prs_merged: m.prs_merged,
                commits_total: m.commits_total,
                reviews_submitted: m.reviews_submitted,
                avg_time_to_merge: m.avg_time_to_merge,
            });
        }
    }

    JoinedTable { rows }
}

/// Parse country rows from any CSV reader with a header row.
///
/// # Errors
///
/// Returns a CSV error when a row is malformed or a required column is absent.
pub fn read_countries<R: Read>(reader: R) -> Result<Vec<CountryRow>, csv::Error> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect()
}

/// Parse metrics rows from any CSV reader with a header row.
///
/// # Errors
///
/// Returns a CSV error when a row is malformed or `login` is absent.
pub fn read_metrics<R: Read>(reader: R) -> Result<Vec<MetricsRow>, csv::Error> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect()
}

/// Load and join both tables from disk.
///
/// # Errors
///
/// - [`AnalysisError::InputMissing`] if either file does not exist.
/// - [`AnalysisError::InputUnreadable`] if either file fails to parse.
/// - [`AnalysisError::EmptyJoin`] if no login is present in both tables.
#[instrument]
pub fn load_inputs(countries_path: &Path, metrics_path: &Path) -> Result<JoinedTable, AnalysisError> {
    let countries = load_table(countries_path, read_countries)?;
    info!(rows = countries.len(), path = %countries_path.display(), "loaded countries table");

    let metrics = load_table(metrics_path, read_metrics)?;
    info!(rows = metrics.len(), path = %metrics_path.display(), "loaded metrics table");

    let joined = join_tables(&countries, &metrics);
    if joined.is_empty() {
        return Err(AnalysisError::EmptyJoin);
    }
    info!(rows = joined.len(), "joined countries and metrics on login");

    Ok(joined)
}

fn load_table<T>(
    path: &Path,
    parse: impl FnOnce(std::fs::File) -> Result<Vec<T>, csv::Error>,
) -> Result<Vec<T>, AnalysisError> {
    if !path.exists() {
        return Err(AnalysisError::InputMissing(path.to_path_buf()));
    }
    let unreadable = |reason: String| AnalysisError::InputUnreadable {
        path: path.to_path_buf(),
        reason,
    };
    let file = std::fs::File::open(path).map_err(|e| unreadable(e.to_string()))?;
    parse(file).map_err(|e| unreadable(e.to_string()))
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw
        .as_deref()
        .and_then(parse_number)
        .map_or(0, |v| if v > 0.0 { v.round() as u64 } else { 0 }))
}

fn lenient_float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse_number))
}
