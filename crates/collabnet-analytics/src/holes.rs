//! Burt's constraint and structural-holes score.
//!
//! # Algorithm
//!
//! For node `i` with neighbors `N(i)` and total incident weight `W(i)`:
//!
//! ```text
//! p_ij       = w_ij / W(i)
//! indirect_j = Σ_{q ∈ N(i) ∩ N(j)} p_iq · w_jq / W(j)
//! constraint = Σ_{j ∈ N(i)} (p_ij + indirect_j)²
//! holes      = clamp(1 - constraint, 0, 1)
//! ```
//!
//! Nodes with at most one neighbor have constraint `1` and holes `0`. A zero
//! total weight is read as `1`. Common neighbors come from merging the two
//! sorted adjacency lists, so a pass costs `O(Σ_i Σ_{j∈N(i)} (deg i + deg j))`
//! time and no memory beyond the output vectors.
//!
//! Nodes are processed in batches; progress and a memory snapshot are logged
//! after each batch.

use std::cmp::Ordering;

use tracing::{info, instrument};

use collabnet_core::timing::log_memory;

use crate::describe::{Summary, top_k};
use crate::graph::CollaborationGraph;

/// Constraint and structural-holes score of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuralHoleScore {
    pub constraint: f64,
    pub structural_holes: f64,
}

/// Scores for every node, indexed by node index.
#[derive(Debug, Clone, Default)]
pub struct StructuralHoles {
    pub constraint: Vec<f64>,
    pub holes: Vec<f64>,
}

impl StructuralHoles {
    #[must_use]
    pub fn get(&self, i: usize) -> StructuralHoleScore {
        StructuralHoleScore {
            constraint: self.constraint[i],
            structural_holes: self.holes[i],
        }
    }

    /// Log distribution statistics and the top five spanners.
    pub fn log_summary(&self, graph: &CollaborationGraph) {
        if let Some(s) = Summary::of(&self.holes) {
            info!(
                mean = s.mean,
                median = s.median,
                min = s.min,
                max = s.max,
                std_dev = s.std_dev,
                "structural holes statistics"
            );
        }
        for (rank, i) in top_k(&self.holes, 5).into_iter().enumerate() {
            info!(
                rank = rank + 1,
                login = graph.login(i),
                structural_holes = self.holes[i],
                constraint = self.constraint[i],
                "top structural hole spanner"
            );
        }
    }
}

/// Compute constraint and structural holes for every node.
///
/// `batch_size` only controls how often progress is reported; `0` is read as
/// one batch for the whole graph.
#[must_use]
#[instrument(skip(graph), fields(nodes = graph.node_count()))]
pub fn structural_holes(graph: &CollaborationGraph, batch_size: usize) -> StructuralHoles {
    let n = graph.node_count();
    let batch_size = if batch_size == 0 { n.max(1) } else { batch_size };

    let mut constraint = Vec::with_capacity(n);
    let mut holes = Vec::with_capacity(n);

    let nodes: Vec<usize> = (0..n).collect();
    for batch in nodes.chunks(batch_size) {
        for &i in batch {
            let c = node_constraint(graph, i);
            constraint.push(c);
            holes.push((1.0 - c).clamp(0.0, 1.0));
        }

        let processed = constraint.len();
        info!(
            processed,
            total = n,
            percent = processed as f64 * 100.0 / n as f64,
            "structural holes progress"
        );
        log_memory("structural holes");
    }

    StructuralHoles { constraint, holes }
}

/// Burt's constraint of node `i`.
#[must_use]
pub fn node_constraint(graph: &CollaborationGraph, i: usize) -> f64 {
    let neighbors = graph.neighbors(i);
    if neighbors.len() <= 1 {
        return 1.0;
    }

    let total_i = graph.total_weight(i);
    neighbors
        .iter()
        .map(|&(j, w_ij)| {
            let direct = f64::from(w_ij) / total_i;
            let total_j = graph.total_weight(j);
            let indirect: f64 = common_neighbors(neighbors, graph.neighbors(j))
                .map(|(w_iq, w_jq)| (f64::from(w_iq) / total_i) * (f64::from(w_jq) / total_j))
                .sum();
            (direct + indirect).powi(2)
        })
        .sum()
}

/// Weights `(w_iq, w_jq)` for every `q` present in both sorted lists.
fn common_neighbors<'a>(
    a: &'a [(usize, u32)],
    b: &'a [(usize, u32)],
) -> impl Iterator<Item = (u32, u32)> + 'a {
    let (mut x, mut y) = (0, 0);
    std::iter::from_fn(move || {
        while x < a.len() && y < b.len() {
            match a[x].0.cmp(&b[y].0) {
                Ordering::Less => x += 1,
                Ordering::Greater => y += 1,
                Ordering::Equal => {
                    let pair = (a[x].1, b[y].1);
                    x += 1;
                    y += 1;
                    return Some(pair);
                }
            }
        }
        None
    })
}
