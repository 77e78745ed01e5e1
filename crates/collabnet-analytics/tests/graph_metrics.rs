//! Known-topology regression tests for the collaboration metrics.
//!
//! Each test uses a hand-crafted set of repositories with known properties.
//! Expected values are computed analytically and hardcoded.

use collabnet_analytics::graph::{CollaborationGraph, Components};
use collabnet_analytics::holes::{node_constraint, structural_holes};
use collabnet_analytics::metrics::{
    BetweennessMethod, ClosenessMethod, EigenvectorMethod, betweenness_centrality,
    compute_centrality, eigenvector_with_fallback,
};
use collabnet_core::config::CentralityConfig;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build(repos: &[(&str, &[&str])]) -> CollaborationGraph {
    CollaborationGraph::build(repos.iter().map(|(r, c)| (*r, c.iter().copied())), 0)
}

fn idx(g: &CollaborationGraph, login: &str) -> usize {
    g.node_index(login)
        .unwrap_or_else(|| panic!("{login} should be a node"))
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Worked example A: one repository {X, Y, Z}.
fn triangle() -> CollaborationGraph {
    build(&[("R1", &["X", "Y", "Z"])])
}

/// Worked example B: R1 = {X, Y, Z}, R2 = {Z, W}.
fn triangle_with_tail() -> CollaborationGraph {
    build(&[("R1", &["X", "Y", "Z"]), ("R2", &["Z", "W"])])
}

fn star(leaves: usize) -> CollaborationGraph {
    let repos: Vec<(String, Vec<String>)> = (0..leaves)
        .map(|i| (format!("repo{i}"), vec!["center".to_string(), format!("leaf{i:02}")]))
        .collect();
    CollaborationGraph::build(repos, 0)
}

// ---------------------------------------------------------------------------
// Worked examples
// ---------------------------------------------------------------------------

#[test]
fn triangle_scores() {
    let g = triangle();
    assert_eq!(g.edge_count(), 3);
    let scores = compute_centrality(&g, &Components::of(&g), &CentralityConfig::default());

    for login in ["X", "Y", "Z"] {
        let s = scores.get(idx(&g, login));
        assert!(approx(s.degree, 1.0), "{login} degree");
        assert!(approx(s.betweenness, 0.0), "{login} betweenness");
        assert!(approx(s.closeness, 1.0), "{login} closeness");
        assert!(approx(s.eigenvector, 1.0 / 3.0_f64.sqrt()), "{login} eigenvector");
    }
    assert_eq!(scores.report.eigenvector, EigenvectorMethod::PowerIteration);
    assert_eq!(scores.report.closeness, ClosenessMethod::LargestComponent { size: 3 });
}

#[test]
fn triangle_with_tail_scores() {
    let g = triangle_with_tail();
    let scores = compute_centrality(&g, &Components::of(&g), &CentralityConfig::default());

    let z = scores.get(idx(&g, "Z"));
    let w = scores.get(idx(&g, "W"));
    let x = scores.get(idx(&g, "X"));

    assert!(approx(z.degree, 1.0));
    assert!(approx(x.degree, 2.0 / 3.0));
    assert!(approx(w.degree, 1.0 / 3.0));

    // Z lies on the shortest paths X–W and Y–W: 2 of 3 pairs.
    assert!(approx(z.betweenness, 2.0 / 3.0));
    assert!(approx(w.betweenness, 0.0));
    assert!(approx(x.betweenness, 0.0));

    assert!(approx(z.closeness, 1.0));
    // W: distances 1 (Z) + 2 (X) + 2 (Y).
    assert!(approx(w.closeness, 3.0 / 5.0));
}

#[test]
fn star_center_has_full_betweenness() {
    let g = star(6);
    let bc = betweenness_centrality(&g, &CentralityConfig::default());
    assert_eq!(bc.method, BetweennessMethod::Exact);
    assert!(approx(bc.scores[idx(&g, "center")], 1.0));
    for i in 0..6 {
        assert!(approx(bc.scores[idx(&g, &format!("leaf{i:02}"))], 0.0));
    }
}

// ---------------------------------------------------------------------------
// Structural holes
// ---------------------------------------------------------------------------

#[test]
fn structural_holes_on_triangle_with_tail() {
    let g = triangle_with_tail();
    let sh = structural_holes(&g, 2);

    // W has one contact: trivial rule.
    let w = sh.get(idx(&g, "W"));
    assert!(approx(w.constraint, 1.0));
    assert!(approx(w.structural_holes, 0.0));

    // Z: 2 · (1/3 + 1/3 · 1/2)² + (1/3)² = 1/2 + 1/9.
    let z = sh.get(idx(&g, "Z"));
    assert!(approx(z.constraint, 0.5 + 1.0 / 9.0));

    // Same ego network without the X–Y tie.
    let open = build(&[("R1", &["X", "Z"]), ("R2", &["Y", "Z"]), ("R3", &["Z", "W"])]);
    let open_z = 1.0 - node_constraint(&open, idx(&open, "Z"));
    assert!(z.structural_holes < open_z);
    assert!(approx(open_z, 2.0 / 3.0));
}

// ---------------------------------------------------------------------------
// Eigenvector fallback
// ---------------------------------------------------------------------------

#[test]
fn forced_non_convergence_falls_back_to_pagerank() {
    let g = triangle_with_tail();
    let config = CentralityConfig {
        eigenvector_max_iter: 1,
        ..CentralityConfig::default()
    };

    let (scores, method, iterations) = eigenvector_with_fallback(&g, &config);
    assert_eq!(method, EigenvectorMethod::PageRankFallback);
    assert_eq!(iterations, 1);
    assert_eq!(scores.len(), g.node_count());
    assert!(scores.iter().all(|&s| s > 0.0 && s <= 1.0));
    assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1e-6);
}

#[test]
fn pagerank_failure_yields_zeros() {
    let g = triangle_with_tail();
    let config = CentralityConfig {
        eigenvector_max_iter: 1,
        pagerank_max_iter: 1,
        pagerank_tolerance: 0.0,
        ..CentralityConfig::default()
    };

    let (scores, method, _) = eigenvector_with_fallback(&g, &config);
    assert_eq!(method, EigenvectorMethod::ZeroFallback);
    assert_eq!(scores, vec![0.0; g.node_count()]);
}

// ---------------------------------------------------------------------------
// Sampled betweenness
// ---------------------------------------------------------------------------

#[test]
fn sampled_betweenness_is_reproducible_and_reports_pivots() {
    let g = star(30);
    let config = CentralityConfig {
        exact_betweenness_max_nodes: 10,
        min_pivots: 4,
        max_pivots: 8,
        seed: 7,
        ..CentralityConfig::default()
    };

    let a = betweenness_centrality(&g, &config);
    let b = betweenness_centrality(&g, &config);
    // sqrt(31) rounds to 6, inside [4, 8].
    assert_eq!(a.method, BetweennessMethod::Sampled { pivots: 6, seed: 7 });
    assert_eq!(a.scores, b.scores);
    assert!(a.scores.iter().all(|&s| s >= 0.0));
}
