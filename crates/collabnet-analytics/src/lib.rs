#![forbid(unsafe_code)]
//! collabnet-analytics library.
//!
//! Builds the weighted developer-collaboration graph and computes the
//! per-developer network metrics: degree, betweenness, closeness and
//! eigenvector centrality, Burt's structural holes, and absence impact.
//! [`pipeline`] drives all of it into batch persistence.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Node maps**: per-node scores are dense `Vec<f64>` indexed by the
//!   graph's node index; [`graph::CollaborationGraph::node_index`] maps a
//!   login to that index.

pub mod describe;
pub mod graph;
pub mod holes;
pub mod impact;
pub mod metrics;
pub mod pipeline;
pub mod report;
