//! Collaboration graph module.
//!
//! # Pipeline
//!
//! ```text
//! JoinedTable::repo_contributors()
//!        ↓  stats::RepoStats::from_repositories()   (logged)
//!        ↓  build::CollaborationGraph::build()
//! CollaborationGraph (UnGraph<login, shared repos> + sorted adjacency)
//!        ↓  components::Components::of()            (connectivity logged)
//!        ↓  stats::GraphStats::compute()
//! GraphStats (density, components, largest-component share, …)
//! ```
//!
//! [`CollaborationGraph::content_hash`] is a BLAKE3 hash of the weighted edge
//! set. Together with the configuration hash it fingerprints a run so that a
//! resumed run only reuses batches computed from the same graph.

pub mod build;
pub mod components;
pub mod stats;

pub use build::CollaborationGraph;
pub use components::Components;
pub use stats::{GraphStats, RepoStats};
