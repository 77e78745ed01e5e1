//! Summary statistics for the repository input and the built graph.
//!
//! # Statistics Provided
//!
//! - **RepoStats**: repository count and the mean / median / max number of
//!   distinct contributors per repository, computed before the graph is
//!   built.
//! - **GraphStats**: node and edge counts, density
//!   `2E / (N (N - 1))`, total and max edge weight, mean degree, connected
//!   component count, and the size and share of the largest component.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::info;

use super::{CollaborationGraph, Components};
use crate::describe::Summary;

// ---------------------------------------------------------------------------
// RepoStats
// ---------------------------------------------------------------------------

/// Contributor counts per repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoStats {
    pub repositories: usize,
    /// Repositories with at least two distinct contributors.
    pub collaborative: usize,
    pub mean_contributors: f64,
    pub median_contributors: f64,
    pub max_contributors: usize,
}

impl RepoStats {
    #[must_use]
    pub fn from_repositories(repos: &BTreeMap<String, Vec<String>>) -> Self {
        let counts: Vec<usize> = repos
            .values()
            .map(|logins| logins.iter().collect::<BTreeSet<_>>().len())
            .collect();
        let as_f64: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
        let summary = Summary::of(&as_f64);

        Self {
            repositories: counts.len(),
            collaborative: counts.iter().filter(|&&c| c >= 2).count(),
            mean_contributors: summary.map_or(0.0, |s| s.mean),
            median_contributors: summary.map_or(0.0, |s| s.median),
            max_contributors: counts.iter().copied().max().unwrap_or(0),
        }
    }

    pub fn log(&self) {
        info!(
            repositories = self.repositories,
            collaborative = self.collaborative,
            mean_contributors = self.mean_contributors,
            median_contributors = self.median_contributors,
            max_contributors = self.max_contributors,
            "repository statistics"
        );
    }
}

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for a collaboration graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Undirected density; zero for graphs with fewer than two nodes.
    pub density: f64,
    /// Sum of all edge weights (shared-repository incidences).
    pub total_edge_weight: u64,
    pub max_edge_weight: u32,
    pub mean_degree: f64,
    pub component_count: usize,
    pub largest_component_size: usize,
    /// Fraction of nodes inside the largest component.
    pub largest_component_share: f64,
    pub content_hash: String,
}

impl GraphStats {
    #[must_use]
    pub fn compute(graph: &CollaborationGraph, components: &Components) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();

        let edges = graph.weighted_edges();
        let total_edge_weight = edges.iter().map(|&(_, _, w)| u64::from(w)).sum();
        let max_edge_weight = edges.iter().map(|&(_, _, w)| w).max().unwrap_or(0);

        let largest_component_size = components.largest().map_or(0, |c| components.size(c));

        Self {
            node_count,
            edge_count,
            density: compute_density(node_count, edge_count),
            total_edge_weight,
            max_edge_weight,
            mean_degree: ratio(2 * edge_count, node_count),
            component_count: components.count(),
            largest_component_size,
            largest_component_share: ratio(largest_component_size, node_count),
            content_hash: graph.content_hash().to_string(),
        }
    }
}

fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    let max_edges = (node_count * (node_count - 1)) as f64 / 2.0;
    edge_count as f64 / max_edges
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}
