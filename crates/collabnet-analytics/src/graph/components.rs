//! Connected components of the collaboration graph.
//!
//! Components are labelled with petgraph's [`UnionFind`] and numbered in order
//! of their smallest node index. Because node indices follow sorted logins,
//! component `0` is the one containing the lexicographically smallest login.

use petgraph::unionfind::UnionFind;
use tracing::info;

use super::CollaborationGraph;

/// Component labelling of every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Components {
    /// `labels[i]` is the component id of node `i`.
    labels: Vec<usize>,
    /// `sizes[c]` is the node count of component `c`.
    sizes: Vec<usize>,
}

impl Components {
    #[must_use]
    pub fn of(graph: &CollaborationGraph) -> Self {
        let n = graph.node_count();
        let mut uf = UnionFind::<usize>::new(n);
        for i in 0..n {
            for &(j, _) in graph.neighbors(i) {
                if j > i {
                    uf.union(i, j);
                }
            }
        }

        let mut root_to_id: Vec<Option<usize>> = vec![None; n];
        let mut labels = Vec::with_capacity(n);
        let mut sizes: Vec<usize> = Vec::new();
        for i in 0..n {
            let root = uf.find_mut(i);
            let id = *root_to_id[root].get_or_insert_with(|| {
                sizes.push(0);
                sizes.len() - 1
            });
            sizes[id] += 1;
            labels.push(id);
        }

        Self { labels, sizes }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    #[must_use]
    pub fn component_of(&self, node: usize) -> usize {
        self.labels[node]
    }

    #[must_use]
    pub fn size(&self, component: usize) -> usize {
        self.sizes[component]
    }

    /// Id of the largest component; ties go to the lower id.
    #[must_use]
    pub fn largest(&self) -> Option<usize> {
        self.sizes
            .iter()
            .enumerate()
            .max_by(|(a_id, a), (b_id, b)| a.cmp(b).then(b_id.cmp(a_id)))
            .map(|(id, _)| id)
    }

    /// Node indices of `component`, ascending.
    #[must_use]
    pub fn members(&self, component: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == component)
            .map(|(i, _)| i)
            .collect()
    }

    /// Log component count and the share of the largest component.
    pub fn log_connectivity(&self) {
        let total: usize = self.sizes.iter().sum();
        let largest = self.largest().map_or(0, |c| self.sizes[c]);
        let share = if total == 0 {
            0.0
        } else {
            largest as f64 / total as f64
        };
        info!(
            components = self.count(),
            largest_component = largest,
            largest_share = share,
            "graph connectivity"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_two_components_and_picks_largest() {
        let g = CollaborationGraph::build(
            [("r1", vec!["a", "b"]), ("r2", vec!["c", "d", "e"])],
            0,
        );
        let comps = Components::of(&g);
        assert_eq!(comps.count(), 2);

        let largest = comps.largest().expect("non-empty");
        assert_eq!(comps.size(largest), 3);
        let members: Vec<&str> = comps.members(largest).into_iter().map(|i| g.login(i)).collect();
        assert_eq!(members, ["c", "d", "e"]);
    }

    #[test]
    fn size_tie_goes_to_component_with_smallest_login() {
        let g = CollaborationGraph::build([("r1", vec!["m", "n"]), ("r2", vec!["b", "a"])], 0);
        let comps = Components::of(&g);
        let largest = comps.largest().expect("non-empty");
        assert_eq!(comps.component_of(g.node_index("a").expect("a")), largest);
    }

    #[test]
    fn empty_graph_has_no_components() {
        let g = CollaborationGraph::build(Vec::<(&str, Vec<&str>)>::new(), 0);
        let comps = Components::of(&g);
        assert_eq!(comps.count(), 0);
        assert!(comps.largest().is_none());
    }
}
