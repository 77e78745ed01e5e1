//! Absence impact: how much a developer's absence would slow merges.
//!
//! ```text
//! time_impact     = avg_time_to_merge / threshold_days
//! activity_weight = (prs_opened + commits_total / 10) / 10
//! impact          = time_impact · activity_weight
//! ```
//!
//! A missing, zero or negative average time gives `0`. The capped variant bounds the
//! time term at `2.0`, the activity term at `1.5` and the product at `1.0`.

use std::collections::BTreeMap;

use tracing::info;

use collabnet_core::config::{ImpactConfig, ImpactVariant};
use collabnet_core::input::DeveloperRow;

use crate::describe::Summary;

const TIME_CAP: f64 = 2.0;
const ACTIVITY_CAP: f64 = 1.5;
const IMPACT_CAP: f64 = 1.0;
/// Scores above this are counted as high impact in the run log.
const HIGH_IMPACT: f64 = 0.8;

/// Activity totals of one developer across all of their joined rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeveloperActivity {
    /// Mean of the non-missing `avg_time_to_merge` values.
    pub avg_time_to_merge: Option<f64>,
    pub prs_opened: u64,
    pub commits_total: u64,
}

impl DeveloperActivity {
    #[must_use]
    pub fn from_rows(rows: &[&DeveloperRow]) -> Self {
        let times: Vec<f64> = rows.iter().filter_map(|r| r.avg_time_to_merge).collect();
        let avg_time_to_merge = if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<f64>() / times.len() as f64)
        };

        Self {
            avg_time_to_merge,
            prs_opened: saturating_total(rows.iter().map(|r| r.prs_opened)),
            commits_total: saturating_total(rows.iter().map(|r| r.commits_total)),
        }
    }
}

/// Sum of activity counters, clamped at `u64::MAX`.
///
/// Oversized input counters already read as `u64::MAX`.
#[must_use]
pub fn saturating_total(counts: impl IntoIterator<Item = u64>) -> u64 {
    counts.into_iter().fold(0, u64::saturating_add)
}

/// Absence impact of one developer.
#[must_use]
pub fn absence_impact(activity: &DeveloperActivity, config: &ImpactConfig) -> f64 {
    let Some(avg_time) = activity.avg_time_to_merge.filter(|&t| t > 0.0) else {
        return 0.0;
    };

    let time_impact = avg_time / config.threshold_days;
    let activity_weight = (activity.prs_opened as f64 + activity.commits_total as f64 / 10.0) / 10.0;

    match config.variant {
        ImpactVariant::Unbounded => time_impact * activity_weight,
        ImpactVariant::Capped => {
            (time_impact.min(TIME_CAP) * activity_weight.min(ACTIVITY_CAP)).min(IMPACT_CAP)
        }
    }
}

/// Absence impact for every developer in `by_developer`.
#[must_use]
pub fn score_developers(
    by_developer: &BTreeMap<&str, Vec<&DeveloperRow>>,
    config: &ImpactConfig,
) -> BTreeMap<String, f64> {
    let scores: BTreeMap<String, f64> = by_developer
        .iter()
        .map(|(login, rows)| {
            let activity = DeveloperActivity::from_rows(rows);
            ((*login).to_string(), absence_impact(&activity, config))
        })
        .collect();

    let values: Vec<f64> = scores.values().copied().collect();
    if let Some(s) = Summary::of(&values) {
        info!(
            developers = s.count,
            variant = ?config.variant,
            mean = s.mean,
            median = s.median,
            high_impact = values.iter().filter(|&&v| v > HIGH_IMPACT).count(),
            "absence impact statistics"
        );
    }

    scores
}
