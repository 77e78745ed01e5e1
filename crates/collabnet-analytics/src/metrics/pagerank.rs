//! Weighted PageRank, used as the eigenvector fallback.
//!
//! # Algorithm
//!
//! Each undirected edge is followed in both directions with transition
//! probability proportional to its weight:
//!
//! ```text
//! PR(v) = (1 - d) / N + d * Σ_u PR(u) * w(u,v) / W(u) + d * D / N
//! ```
//!
//! where `W(u)` is the total incident weight of `u` and `D` the rank mass
//! sitting on dangling (edgeless) nodes. Iteration stops once the L1 change
//! drops below `N * tolerance`. Ranks sum to 1.

use tracing::{debug, instrument};

use crate::graph::CollaborationGraph;

/// PageRank parameters.
#[derive(Debug, Clone, Copy)]
pub struct PageRankConfig {
    /// Damping factor (probability of following an edge vs teleporting).
    pub damping: f64,
    /// Per-node convergence tolerance.
    pub tolerance: f64,
    pub max_iter: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iter: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRankError {
    #[error("pagerank undefined on an empty graph")]
    EmptyGraph,
    #[error("pagerank did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },
}

/// Compute PageRank for every node, indexed by node index.
///
/// # Errors
///
/// [`PageRankError::EmptyGraph`] for a graph without nodes,
/// [`PageRankError::NotConverged`] when `max_iter` is exhausted.
#[instrument(skip(graph))]
pub fn pagerank(graph: &CollaborationGraph, config: &PageRankConfig) -> Result<Vec<f64>, PageRankError> {
    let n = graph.node_count();
    if n == 0 {
        return Err(PageRankError::EmptyGraph);
    }

    let n_f64 = n as f64;
    let d = config.damping;
    let mut ranks = vec![1.0 / n_f64; n];
    let mut next = vec![0.0_f64; n];

    for iter in 1..=config.max_iter {
        let dangling: f64 = (0..n)
            .filter(|&i| graph.degree(i) == 0)
            .map(|i| ranks[i])
            .sum();
        let base = (1.0 - d).mul_add(1.0 / n_f64, d * dangling / n_f64);
        next.fill(base);

        for (u, &rank) in ranks.iter().enumerate() {
            let out = graph.total_weight(u);
            for &(v, w) in graph.neighbors(u) {
                next[v] += d * rank * f64::from(w) / out;
            }
        }

        let delta: f64 = ranks.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut ranks, &mut next);

        if delta < n_f64 * config.tolerance {
            debug!(iterations = iter, "pagerank converged");
            return Ok(ranks);
        }
    }

    Err(PageRankError::NotConverged {
        iterations: config.max_iter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_sum_to_one_and_favor_hub() {
        let g = CollaborationGraph::build(
            [("a", ["hub", "l1"]), ("b", ["hub", "l2"]), ("c", ["hub", "l3"])],
            0,
        );
        let pr = pagerank(&g, &PageRankConfig::default()).expect("converges");
        let sum: f64 = pr.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);

        let hub = g.node_index("hub").expect("hub");
        let leaf = g.node_index("l1").expect("l1");
        assert!(pr[hub] > pr[leaf]);
        assert!(pr.iter().all(|&r| (0.0..=1.0).contains(&r)));
    }

    #[test]
    fn heavier_edges_attract_more_rank() {
        let g = CollaborationGraph::build(
            [("r1", vec!["a", "b", "c"]), ("r2", vec!["a", "b"]), ("r3", vec!["a", "b"])],
            0,
        );
        let pr = pagerank(&g, &PageRankConfig::default()).expect("converges");
        let b = g.node_index("b").expect("b");
        let c = g.node_index("c").expect("c");
        assert!(pr[b] > pr[c]);
    }

    #[test]
    fn empty_graph_and_exhausted_iterations_are_errors() {
        let empty = CollaborationGraph::build(Vec::<(&str, Vec<&str>)>::new(), 0);
        assert_eq!(
            pagerank(&empty, &PageRankConfig::default()),
            Err(PageRankError::EmptyGraph)
        );

        let g = CollaborationGraph::build([("r", vec!["a", "b", "c"]), ("s", vec!["c", "d"])], 0);
        let config = PageRankConfig {
            max_iter: 1,
            tolerance: 0.0,
            ..PageRankConfig::default()
        };
        assert_eq!(
            pagerank(&g, &config),
            Err(PageRankError::NotConverged { iterations: 1 })
        );
    }
}
