//! Centrality metrics for the collaboration graph.
//!
//! # Overview
//!
//! Each metric answers a different question about a developer's position:
//!
//! - **Degree** (`degree`): how many distinct collaborators?
//! - **Betweenness** (`betweenness`): who bridges otherwise distant groups?
//! - **Closeness** (`closeness`): who can reach everyone in few hops?
//! - **Eigenvector** (`eigenvector`): who is tied to other central developers?
//!   Falls back to weighted PageRank (`pagerank`) when power iteration does
//!   not converge, and to all zeros when PageRank fails too.
//!
//! # Usage
//!
//! All metrics return dense `Vec<f64>` indexed by node index.
//! [`compute_centrality`] runs all four and records which method produced
//! each vector.
//!
//! ```rust,ignore
//! let graph = CollaborationGraph::build(&repos, 50);
//! let components = Components::of(&graph);
//! let scores = compute_centrality(&graph, &components, &config.centrality);
//! let alice = scores.get(graph.node_index("alice").unwrap());
//! ```

pub mod betweenness;
pub mod closeness;
pub mod degree;
pub mod eigenvector;
pub mod pagerank;

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use collabnet_core::config::CentralityConfig;
use collabnet_core::timing::log_memory;

use crate::graph::{CollaborationGraph, Components};

pub use betweenness::{BetweennessMethod, betweenness_centrality};
pub use closeness::{ClosenessMethod, closeness_centrality};
pub use degree::degree_centrality;
pub use eigenvector::eigenvector_centrality;
pub use pagerank::{PageRankConfig, PageRankError, pagerank};

/// Which computation produced the eigenvector column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EigenvectorMethod {
    PowerIteration,
    PageRankFallback,
    ZeroFallback,
}

/// The four centrality values of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CentralityScore {
    pub degree: f64,
    pub betweenness: f64,
    pub closeness: f64,
    pub eigenvector: f64,
}

/// Methods used for a centrality run; serialized into the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CentralityReport {
    pub betweenness: BetweennessMethod,
    pub closeness: ClosenessMethod,
    pub eigenvector: EigenvectorMethod,
    pub eigenvector_iterations: usize,
}

/// Centrality vectors for every node, indexed by node index.
#[derive(Debug, Clone)]
pub struct CentralityScores {
    pub degree: Vec<f64>,
    pub betweenness: Vec<f64>,
    pub closeness: Vec<f64>,
    pub eigenvector: Vec<f64>,
    pub report: CentralityReport,
}

impl CentralityScores {
    /// Scores of node `i`.
    #[must_use]
    pub fn get(&self, i: usize) -> CentralityScore {
        CentralityScore {
            degree: self.degree[i],
            betweenness: self.betweenness[i],
            closeness: self.closeness[i],
            eigenvector: self.eigenvector[i],
        }
    }
}

/// Compute degree, betweenness, closeness and eigenvector centrality.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count()))]
pub fn compute_centrality(
    graph: &CollaborationGraph,
    components: &Components,
    config: &CentralityConfig,
) -> CentralityScores {
    let degree = degree_centrality(graph);
    info!("degree centrality computed");

    let bc = betweenness_centrality(graph, config);
    info!(method = ?bc.method, "betweenness centrality computed");
    log_memory("betweenness");

    let cc = closeness_centrality(graph, components, config.harmonic_closeness_min_nodes);
    info!(method = ?cc.method, "closeness centrality computed");
    log_memory("closeness");

    let (eigenvector, eigenvector_method, eigenvector_iterations) =
        eigenvector_with_fallback(graph, config);
    info!(method = ?eigenvector_method, "eigenvector centrality computed");

    CentralityScores {
        degree,
        betweenness: bc.scores,
        closeness: cc.scores,
        eigenvector,
        report: CentralityReport {
            betweenness: bc.method,
            closeness: cc.method,
            eigenvector: eigenvector_method,
            eigenvector_iterations,
        },
    }
}

/// Power iteration, then PageRank, then zeros.
///
/// Returns the scores, the method that produced them, and the power
/// iteration count.
#[must_use]
pub fn eigenvector_with_fallback(
    graph: &CollaborationGraph,
    config: &CentralityConfig,
) -> (Vec<f64>, EigenvectorMethod, usize) {
    let ev = eigenvector_centrality(
        graph,
        config.eigenvector_max_iter,
        config.eigenvector_tolerance,
    );
    if ev.converged {
        return (ev.scores, EigenvectorMethod::PowerIteration, ev.iterations);
    }

    warn!(
        iterations = ev.iterations,
        "eigenvector power iteration did not converge; falling back to pagerank"
    );
    let pr_config = PageRankConfig {
        damping: config.pagerank_damping,
        tolerance: config.pagerank_tolerance,
        max_iter: config.pagerank_max_iter,
    };
    match pagerank(graph, &pr_config) {
        Ok(scores) => (scores, EigenvectorMethod::PageRankFallback, ev.iterations),
        Err(err) => {
            error!(%err, "pagerank fallback failed; eigenvector scores set to zero");
            (
                vec![0.0; graph.node_count()],
                EigenvectorMethod::ZeroFallback,
                ev.iterations,
            )
        }
    }
}
