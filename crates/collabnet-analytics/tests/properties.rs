//! Property tests for graph construction and the bounded metrics.

use std::collections::BTreeMap;

use proptest::prelude::*;

use collabnet_analytics::graph::CollaborationGraph;
use collabnet_analytics::holes::structural_holes;
use collabnet_analytics::metrics::degree_centrality;

/// Up to 12 repositories drawing contributors from a pool of 10 logins.
fn arb_repos() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::vec(prop::collection::vec(0u8..10, 0..6), 0..12).prop_map(|repos| {
        repos
            .into_iter()
            .enumerate()
            .map(|(i, members)| {
                (
                    format!("repo{i}"),
                    members.into_iter().map(|m| format!("dev{m}")).collect(),
                )
            })
            .collect()
    })
}

fn weight_table(g: &CollaborationGraph) -> BTreeMap<(String, String), u32> {
    g.weighted_edges()
        .into_iter()
        .map(|(a, b, w)| ((a.to_string(), b.to_string()), w))
        .collect()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn degree_centrality_is_bounded(repos in arb_repos()) {
        let g = CollaborationGraph::build(repos, 0);
        for d in degree_centrality(&g) {
            prop_assert!((0.0..=1.0).contains(&d));
        }
    }

    #[test]
    fn edges_have_positive_weight_and_no_self_loops(repos in arb_repos()) {
        let g = CollaborationGraph::build(repos, 0);
        for i in 0..g.node_count() {
            for &(j, w) in g.neighbors(i) {
                prop_assert!(w >= 1);
                prop_assert_ne!(i, j);
            }
        }
    }

    #[test]
    fn build_is_order_independent(repos in arb_repos(), seed in any::<u64>()) {
        let forward = CollaborationGraph::build(repos.clone(), 0);

        // Reverse repository order and rotate each contributor list.
        let shuffled: Vec<(String, Vec<String>)> = repos
            .into_iter()
            .rev()
            .map(|(name, mut members)| {
                if !members.is_empty() {
                    let by = (seed as usize) % members.len();
                    members.rotate_left(by);
                }
                (name, members)
            })
            .collect();
        let backward = CollaborationGraph::build(shuffled, 0);

        prop_assert_eq!(weight_table(&forward), weight_table(&backward));
        prop_assert_eq!(forward.content_hash(), backward.content_hash());
    }

    #[test]
    fn degree_one_nodes_have_no_structural_holes(repos in arb_repos()) {
        let g = CollaborationGraph::build(repos, 0);
        let sh = structural_holes(&g, 3);
        for i in 0..g.node_count() {
            if g.degree(i) == 1 {
                prop_assert!(sh.holes[i].abs() < f64::EPSILON);
            }
            prop_assert!((0.0..=1.0).contains(&sh.holes[i]));
        }
    }
}
