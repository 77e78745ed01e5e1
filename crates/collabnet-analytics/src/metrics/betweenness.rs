//! Betweenness centrality via Brandes' algorithm, exact or pivot-sampled.
//!
//! # Algorithm
//!
//! Brandes (2001) on the unweighted, undirected graph:
//!
//! 1. For each source `s`, BFS to get shortest-path counts `σ` and distances.
//! 2. Accumulate dependencies `δ` in reverse BFS order.
//! 3. Sum `δ` over all sources.
//!
//! Summing over every source counts each unordered pair twice, so dividing by
//! `(n-1)(n-2)` yields the usual undirected normalization `2/((n-1)(n-2))`
//! over unordered pairs. A star center scores exactly `1.0`.
//!
//! # Sampling
//!
//! Above `exact_betweenness_max_nodes` only `k` pivot sources are used, drawn
//! uniformly without replacement from an RNG seeded with the configured seed,
//! and the sum is scaled by `n / k`. Complexity drops from `O(V·E)` to
//! `O(k·E)`.

use std::collections::VecDeque;

use rand::{SeedableRng, rngs::StdRng, seq::IteratorRandom};
use serde::Serialize;
use tracing::{info, instrument};

use collabnet_core::config::CentralityConfig;

use crate::graph::CollaborationGraph;

/// How betweenness was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BetweennessMethod {
    Exact,
    Sampled { pivots: usize, seed: u64 },
}

#[derive(Debug, Clone)]
pub struct BetweennessResult {
    /// Normalized scores indexed by node index.
    pub scores: Vec<f64>,
    pub method: BetweennessMethod,
}

/// Pivot count for a graph of `n` nodes:
/// `min(max_pivots, max(min_pivots, round(sqrt(n))))`, never more than `n`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pivot_count(n: usize, min_pivots: usize, max_pivots: usize) -> usize {
    let root = (n as f64).sqrt().round() as usize;
    root.max(min_pivots).min(max_pivots).min(n)
}

/// Compute betweenness, exact for `n ≤ exact_betweenness_max_nodes`.
#[must_use]
#[instrument(skip(graph, config))]
pub fn betweenness_centrality(
    graph: &CollaborationGraph,
    config: &CentralityConfig,
) -> BetweennessResult {
    let n = graph.node_count();

    if n <= config.exact_betweenness_max_nodes {
        let raw = brandes(graph, 0..n);
        return BetweennessResult {
            scores: rescale(raw, n, 1.0),
            method: BetweennessMethod::Exact,
        };
    }

    let k = pivot_count(n, config.min_pivots, config.max_pivots);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pivots = (0..n).choose_multiple(&mut rng, k);
    pivots.sort_unstable();
    info!(nodes = n, pivots = k, seed = config.seed, "sampling betweenness pivots");

    let raw = brandes(graph, pivots);
    BetweennessResult {
        scores: rescale(raw, n, n as f64 / k.max(1) as f64),
        method: BetweennessMethod::Sampled {
            pivots: k,
            seed: config.seed,
        },
    }
}

/// Raw Brandes dependency sums over the given sources.
fn brandes(graph: &CollaborationGraph, sources: impl IntoIterator<Item = usize>) -> Vec<f64> {
    let n = graph.node_count();
    let mut cb = vec![0.0; n];

    // Buffers reused across sources.
    let mut stack: Vec<usize> = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0_f64; n];
    let mut dist: Vec<i64> = vec![-1; n];
    let mut delta = vec![0.0_f64; n];
    let mut queue: VecDeque<usize> = VecDeque::new();

    for s in sources {
        stack.clear();
        for p in &mut predecessors {
            p.clear();
        }
        sigma.fill(0.0);
        dist.fill(-1);
        delta.fill(0.0);

        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &(w, _) in graph.neighbors(v) {
                // First visit to w?
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                // Shortest path to w via v?
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                cb[w] += delta[w];
            }
        }
    }

    cb
}

fn rescale(mut raw: Vec<f64>, n: usize, sample_factor: f64) -> Vec<f64> {
    if n <= 2 {
        return raw;
    }
    let scale = sample_factor / ((n - 1) * (n - 2)) as f64;
    for x in &mut raw {
        *x *= scale;
    }
    raw
}
