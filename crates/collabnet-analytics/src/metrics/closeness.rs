//! Closeness centrality: classical on the largest component, or harmonic.
//!
//! - **LargestComponent** (`n ≤ harmonic_closeness_min_nodes`): for each node
//!   `v` of the largest connected component with `m` members,
//!   `C(v) = (m - 1) / Σ_u dist(v, u)`. A node adjacent to every other member
//!   scores `1.0`. Nodes outside the component score `0`.
//! - **Harmonic** (larger graphs): `HC(v) = Σ_{u ≠ v} 1 / dist(v, u)` over the
//!   whole graph, unreachable pairs contributing `0`. Not normalized.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{info, instrument};

use crate::graph::{CollaborationGraph, Components};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClosenessMethod {
    Harmonic,
    LargestComponent { size: usize },
}

#[derive(Debug, Clone)]
pub struct ClosenessResult {
    pub scores: Vec<f64>,
    pub method: ClosenessMethod,
}

#[must_use]
#[instrument(skip(graph, components))]
pub fn closeness_centrality(
    graph: &CollaborationGraph,
    components: &Components,
    harmonic_min_nodes: usize,
) -> ClosenessResult {
    let n = graph.node_count();
    let mut scores = vec![0.0; n];
    let mut bfs = Bfs::new(n);

    if n > harmonic_min_nodes {
        info!(nodes = n, "using harmonic closeness");
        for (v, score) in scores.iter_mut().enumerate() {
            bfs.run(graph, v);
            *score = bfs
                .reached()
                .iter()
                .filter(|&&u| u != v)
                .map(|&u| 1.0 / bfs.distance(u) as f64)
                .sum();
        }
        return ClosenessResult {
            scores,
            method: ClosenessMethod::Harmonic,
        };
    }

    let Some(largest) = components.largest() else {
        return ClosenessResult {
            scores,
            method: ClosenessMethod::LargestComponent { size: 0 },
        };
    };
    let members = components.members(largest);
    let m = members.len();
    info!(component_size = m, nodes = n, "closeness on largest component");

    for &v in &members {
        bfs.run(graph, v);
        let total: usize = bfs.reached().iter().map(|&u| bfs.distance(u)).sum();
        if total > 0 {
            scores[v] = (m - 1) as f64 / total as f64;
        }
    }

    ClosenessResult {
        scores,
        method: ClosenessMethod::LargestComponent { size: m },
    }
}

/// Reusable breadth-first search over the unweighted graph.
struct Bfs {
    dist: Vec<usize>,
    order: Vec<usize>,
    queue: VecDeque<usize>,
}

impl Bfs {
    fn new(n: usize) -> Self {
        Self {
            dist: vec![usize::MAX; n],
            order: Vec::with_capacity(n),
            queue: VecDeque::new(),
        }
    }

    fn run(&mut self, graph: &CollaborationGraph, source: usize) {
        for &u in &self.order {
            self.dist[u] = usize::MAX;
        }
        self.order.clear();

        self.dist[source] = 0;
        self.queue.push_back(source);
        while let Some(v) = self.queue.pop_front() {
            self.order.push(v);
            for &(w, _) in graph.neighbors(v) {
                if self.dist[w] == usize::MAX {
                    self.dist[w] = self.dist[v] + 1;
                    self.queue.push_back(w);
                }
            }
        }
    }

    /// Nodes reached by the last run, source included, in BFS order.
    fn reached(&self) -> &[usize] {
        &self.order
    }

    fn distance(&self, node: usize) -> usize {
        self.dist[node]
    }
}
