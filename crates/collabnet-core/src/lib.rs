#![forbid(unsafe_code)]
//! collabnet-core library.
//!
//! Input tables and their join, developer classification, the output record,
//! configuration, error codes, step timing and batch persistence.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` at orchestration boundaries, `thiserror`
//!   enums ([`error::AnalysisError`], [`persist::PersistError`]) for domain
//!   failures, each mapped to a stable [`error::ErrorCode`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod input;
pub mod persist;
pub mod profile;
pub mod record;
pub mod timing;
