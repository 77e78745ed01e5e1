//! Eigenvector centrality via power iteration.
//!
//! # Algorithm
//!
//! Power iteration on `(A + I)` of the **unweighted** adjacency matrix:
//!
//! 1. Start from the uniform vector `1/n`.
//! 2. `x_new(v) = x(v) + Σ_{u ∈ N(v)} x(u)`.
//! 3. Normalize `x_new` to unit L2 norm.
//! 4. Stop when `Σ |x_new - x| < n * tolerance`.
//!
//! The identity shift keeps bipartite graphs (stars, paths) from oscillating
//! between two vectors; it does not change the dominant eigenvector.
//!
//! Non-convergence is reported, not hidden: the caller decides on a fallback.

use tracing::{debug, instrument};

use crate::graph::CollaborationGraph;

/// Result of eigenvector centrality computation.
#[derive(Debug, Clone)]
pub struct EigenvectorResult {
    /// Scores indexed by node index. Meaningless when `converged` is false.
    pub scores: Vec<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged within `max_iter`.
    pub converged: bool,
}

/// Compute eigenvector centrality for every node.
#[must_use]
#[instrument(skip(graph))]
pub fn eigenvector_centrality(
    graph: &CollaborationGraph,
    max_iter: usize,
    tolerance: f64,
) -> EigenvectorResult {
    let n = graph.node_count();
    if n == 0 {
        return EigenvectorResult {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }

    let mut scores = vec![1.0 / n as f64; n];
    let threshold = n as f64 * tolerance;

    for iter in 1..=max_iter {
        let mut next = scores.clone();
        for (v, value) in next.iter_mut().enumerate() {
            *value += graph.neighbors(v).iter().map(|&(u, _)| scores[u]).sum::<f64>();
        }

        let norm = next.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in &mut next {
                *x /= norm;
            }
        }

        let diff: f64 = scores.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        scores = next;

        if diff < threshold {
            debug!(iterations = iter, "eigenvector converged");
            return EigenvectorResult {
                scores,
                iterations: iter,
                converged: true,
            };
        }
    }

    EigenvectorResult {
        scores,
        iterations: max_iter,
        converged: false,
    }
}
