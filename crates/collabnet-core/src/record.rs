//! The per-developer output row of the consolidated result table.

use serde::{Deserialize, Serialize};

use crate::profile::{CountryType, DeveloperProfile};

/// One row of `network_metrics.csv`.
///
/// Field order is the column order of the written table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperMetrics {
    pub login: String,
    pub degree_centrality: f64,
    pub betweenness_centrality: f64,
    pub closeness_centrality: f64,
    pub eigenvector_centrality: f64,
    pub structural_hole_spanners: f64,
    pub absence_impact: f64,
    pub developer_profile: DeveloperProfile,
    /// Raw neighbor count in the collaboration graph.
    pub degree: usize,
    pub is_isolated: bool,
    pub country: String,
    pub country_type: CountryType,
    pub prs_opened: u64,
    pub commits_total: u64,
    pub reviews_submitted: u64,
}
