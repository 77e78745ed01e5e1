//! Collaboration graph construction from repository contributor lists.
//!
//! # Overview
//!
//! Every repository with `k ≥ 2` distinct contributors adds `+1` to the weight
//! of each of its `k(k-1)/2` contributor pairs. The resulting weight of an
//! edge is the number of distinct repositories the two developers share.
//!
//! ## Canonical Form
//!
//! Pairs are keyed lexicographically (smaller login first) and accumulated in
//! a `BTreeMap`; nodes are inserted in sorted login order and edges in sorted
//! pair order. The node index of a login is therefore its rank among all
//! logins, and neither repository order nor contributor order can change the
//! graph, its indices, or its content hash.
//!
//! ## Nodes Come From Edges
//!
//! A developer who never shares a repository with anyone is not a node.
//!
//! ## Cache Invalidation
//!
//! [`CollaborationGraph::content_hash`] is a BLAKE3 hash of the sorted
//! weighted edge list. It keys checkpoint resumption.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use tracing::{info, instrument};

use collabnet_core::timing::log_memory;

// ---------------------------------------------------------------------------
// CollaborationGraph
// ---------------------------------------------------------------------------

/// Weighted, undirected developer-collaboration graph.
///
/// Read-only after construction. Besides the petgraph view it keeps a sorted
/// adjacency list per node and the cached total incident weight, which the
/// metric passes use directly.
#[derive(Debug, Clone)]
pub struct CollaborationGraph {
    /// Undirected graph: nodes = logins, edge weight = shared repositories.
    pub graph: UnGraph<String, u32>,
    /// Mapping from login to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    adjacency: Vec<Vec<(usize, u32)>>,
    total_weight: Vec<f64>,
    content_hash: String,
}

impl CollaborationGraph {
    /// Build the graph from `(repository, contributors)` pairs.
    ///
    /// Duplicate logins within a repository and empty logins are ignored.
    /// Progress and a memory snapshot are logged every `progress_every`
    /// repositories (`0` disables it).
    #[instrument(skip(repos))]
    pub fn build<I, R, C, L>(repos: I, progress_every: usize) -> Self
    where
        I: IntoIterator<Item = (R, C)>,
        R: AsRef<str>,
        C: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut weights: BTreeMap<(String, String), u32> = BTreeMap::new();
        let mut processed = 0usize;
        let mut collaborative = 0usize;

        for (_repo, contributors) in repos {
            let members: BTreeSet<String> = contributors
                .into_iter()
                .map(|l| l.as_ref().trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();

            if members.len() >= 2 {
                collaborative += 1;
                let members: Vec<&String> = members.iter().collect();
                for (i, a) in members.iter().enumerate() {
                    for b in &members[i + 1..] {
                        *weights.entry(((*a).clone(), (*b).clone())).or_insert(0) += 1;
                    }
                }
            }

            processed += 1;
            if progress_every > 0 && processed % progress_every == 0 {
                info!(processed, pairs = weights.len(), "repositories processed");
                log_memory("graph build");
            }
        }

        let graph = Self::from_weighted_pairs(&weights);
        info!(
            repositories = processed,
            collaborative,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "collaboration graph built"
        );
        graph
    }

    /// Assemble the graph from canonical `(a, b) → weight` pairs with `a < b`.
    fn from_weighted_pairs(weights: &BTreeMap<(String, String), u32>) -> Self {
        let logins: BTreeSet<&str> = weights
            .keys()
            .flat_map(|(a, b)| [a.as_str(), b.as_str()])
            .collect();

        let mut graph = UnGraph::<String, u32>::with_capacity(logins.len(), weights.len());
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(logins.len());
        for login in logins {
            let idx = graph.add_node(login.to_string());
            node_map.insert(login.to_string(), idx);
        }

        let n = graph.node_count();
        let mut adjacency: Vec<Vec<(usize, u32)>> = vec![Vec::new(); n];
        let mut hasher = blake3::Hasher::new();

        for ((a, b), &w) in weights {
            let (ia, ib) = (node_map[a], node_map[b]);
            graph.add_edge(ia, ib, w);
            adjacency[ia.index()].push((ib.index(), w));
            adjacency[ib.index()].push((ia.index(), w));

            hasher.update(a.as_bytes());
            hasher.update(b"\x00");
            hasher.update(b.as_bytes());
            hasher.update(b"\x00");
            hasher.update(&w.to_le_bytes());
            hasher.update(b"\n");
        }

        for list in &mut adjacency {
            list.sort_unstable_by_key(|&(j, _)| j);
        }
        let total_weight = adjacency
            .iter()
            .map(|list| list.iter().map(|&(_, w)| f64::from(w)).sum())
            .collect();

        Self {
            graph,
            node_map,
            adjacency,
            total_weight,
            content_hash: format!("blake3:{}", hasher.finalize()),
        }
    }

    /// Return the number of nodes (developers) in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges (collaborating pairs) in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Dense index of a login, if it is a node.
    #[must_use]
    pub fn node_index(&self, login: &str) -> Option<usize> {
        self.node_map.get(login).map(|idx| idx.index())
    }

    /// Login of node `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a node index of this graph.
    #[must_use]
    pub fn login(&self, i: usize) -> &str {
        &self.graph[NodeIndex::new(i)]
    }

    /// Neighbors of `i` with edge weights, sorted by node index.
    #[must_use]
    pub fn neighbors(&self, i: usize) -> &[(usize, u32)] {
        &self.adjacency[i]
    }

    #[must_use]
    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }

    /// Weight of edge `{i, j}`, `None` when the pair never collaborated.
    #[must_use]
    pub fn weight(&self, i: usize, j: usize) -> Option<u32> {
        let list = &self.adjacency[i];
        list.binary_search_by_key(&j, |&(k, _)| k)
            .ok()
            .map(|pos| list[pos].1)
    }

    /// Sum of incident edge weights of `i`; `1.0` when that sum is zero.
    #[must_use]
    pub fn total_weight(&self, i: usize) -> f64 {
        let w = self.total_weight[i];
        if w > 0.0 { w } else { 1.0 }
    }

    /// BLAKE3 hash of the sorted weighted edge list.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// All edges as `(login_a, login_b, weight)` with `login_a < login_b`,
    /// in sorted order.
    #[must_use]
    pub fn weighted_edges(&self) -> Vec<(&str, &str, u32)> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (i, list) in self.adjacency.iter().enumerate() {
            for &(j, w) in list.iter().filter(|&&(j, _)| j > i) {
                edges.push((self.login(i), self.login(j), w));
            }
        }
        edges
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn build(repos: &[(&str, &[&str])]) -> CollaborationGraph {
        CollaborationGraph::build(repos.iter().map(|(r, c)| (*r, c.iter().copied())), 0)
    }

    #[test]
    fn shared_repositories_accumulate_weight() {
        let g = build(&[("r1", &["x", "y", "z"]), ("r2", &["y", "x"])]);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);

        let (x, y, z) = (
            g.node_index("x").expect("x"),
            g.node_index("y").expect("y"),
            g.node_index("z").expect("z"),
        );
        assert_eq!(g.weight(x, y), Some(2));
        assert_eq!(g.weight(y, x), Some(2));
        assert_eq!(g.weight(x, z), Some(1));
        assert!((g.total_weight(x) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn duplicates_and_single_contributor_repos_add_nothing() {
        let g = build(&[("r1", &["x", "x"]), ("r2", &["solo"]), ("r3", &["x", "y", "y", ""])]);
        assert_eq!(g.node_count(), 2);
        assert!(g.node_index("solo").is_none());
        let x = g.node_index("x").expect("x");
        let y = g.node_index("y").expect("y");
        assert_eq!(g.weight(x, y), Some(1));
        assert_eq!(g.weight(x, x), None);
    }

    #[test]
    fn node_indices_follow_sorted_logins() {
        let g = build(&[("r1", &["zed", "amy", "mo"])]);
        assert_eq!(g.login(0), "amy");
        assert_eq!(g.login(1), "mo");
        assert_eq!(g.login(2), "zed");
        assert_eq!(g.neighbors(1), &[(0, 1), (2, 1)]);
    }

    #[test]
    fn empty_input_gives_empty_graph() {
        let g = build(&[]);
        assert!(g.is_empty());
        assert_eq!(g.edge_count(), 0);
        assert!(g.content_hash().starts_with("blake3:"));
    }

    #[test]
    fn content_hash_changes_with_weights() {
        let a = build(&[("r1", &["x", "y"])]);
        let b = build(&[("r1", &["x", "y"]), ("r2", &["x", "y"])]);
        assert_ne!(a.content_hash(), b.content_hash());
        assert_eq!(a.weighted_edges(), vec![("x", "y", 1)]);
        assert_eq!(b.weighted_edges(), vec![("x", "y", 2)]);
    }
}
