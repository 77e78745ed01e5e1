//! Degree centrality: `deg(v) / (n - 1)`.

use crate::graph::CollaborationGraph;

/// Degree centrality for every node, indexed by node index.
///
/// A single-node graph gives that node `1.0`; an empty graph gives an empty
/// vector. Values are always within `[0, 1]` because the graph has no
/// self-loops or parallel edges.
#[must_use]
pub fn degree_centrality(graph: &CollaborationGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![1.0; n];
    }

    let scale = 1.0 / (n - 1) as f64;
    (0..n).map(|i| graph.degree(i) as f64 * scale).collect()
}
