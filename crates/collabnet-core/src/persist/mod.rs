//! Batched, checkpointed persistence of per-developer result rows.
//!
//! # Overview
//!
//! A long analysis run writes its output in fixed-size batches so a crash
//! loses at most one batch of work:
//!
//! ```text
//! keys (sorted) ──chunk(batch_size)──▶ batch N
//!        │                                │ produce rows
//!        │                                ▼
//!        │                  partial_batch_NNN.csv  (tmp + fsync + rename)
//!        │                                │
//!        │                                ▼
//!        │                  checkpoint.log += "batch-NNN"  (fsync)
//!        ▼
//! consolidate 1..=N ──▶ network_metrics.csv ──▶ delete partials + log
//! ```
//!
//! On restart with the same fingerprint, batches already listed in the
//! checkpoint log (and whose partial file exists) are skipped. Resumption is
//! idempotent at batch granularity, not at row granularity inside a batch.
//!
//! The output directory is guarded by a [`RunLock`] for the lifetime of a
//! [`BatchPersistence`], so there is a single writer per directory.

pub mod batch;
pub mod checkpoint;
pub mod lock;

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use crate::error::ErrorCode;
use crate::timing::log_memory;

pub use batch::PartialStore;
pub use checkpoint::{CheckpointLog, CheckpointState};
pub use lock::RunLock;

/// File name of the consolidated result table.
pub const FINAL_TABLE_NAME: &str = "network_metrics.csv";
/// File name of the checkpoint log.
pub const CHECKPOINT_FILE_NAME: &str = "checkpoint.log";
/// Prefix of partial batch files.
pub const PARTIAL_PREFIX: &str = "partial_batch";

/// Persistence failures. All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("{}: failed to write partial batch {}: {reason}", ErrorCode::PartialWriteFailed, .path.display())]
    PartialWrite { path: PathBuf, reason: String },

    #[error("{}: failed to consolidate into {}: {reason}", ErrorCode::ConsolidationFailed, .path.display())]
    Consolidation { path: PathBuf, reason: String },

    #[error("{}: output directory is locked by another run ({})", ErrorCode::LockContention, .path.display())]
    Locked { path: PathBuf },

    #[error("{}: I/O error on {}: {source}", ErrorCode::PartialWriteFailed, .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::PartialWrite { .. } | Self::Io { .. } => ErrorCode::PartialWriteFailed,
            Self::Consolidation { .. } => ErrorCode::ConsolidationFailed,
            Self::Locked { .. } => ErrorCode::LockContention,
        }
    }
}

/// Outcome of [`BatchPersistence::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Total number of batches the key set splits into.
    pub batches: usize,
    /// Batches written during this call.
    pub written: usize,
    /// Batches skipped because the checkpoint already had them.
    pub skipped: usize,
    /// Rows produced during this call.
    pub rows_written: usize,
}

/// Batch writer bound to one output directory and one run fingerprint.
#[derive(Debug)]
pub struct BatchPersistence {
    dir: PathBuf,
    batch_size: usize,
    store: PartialStore,
    checkpoint: CheckpointLog,
    state: CheckpointState,
    _lock: RunLock,
}

impl BatchPersistence {
    /// Lock `dir`, then open its checkpoint log for `fingerprint`.
    ///
    /// When the log is fresh or discarded, stale partial files are deleted so
    /// they can never be mixed into this run's output.
    ///
    /// # Errors
    ///
    /// [`PersistError::Locked`] if another run holds the directory, or
    /// [`PersistError::Io`] if the checkpoint or stale partials cannot be
    /// handled.
    #[instrument(skip(dir), fields(dir = %dir.display()))]
    pub fn open(
        dir: &Path,
        batch_size: usize,
        fingerprint: &str,
        resume: bool,
    ) -> Result<Self, PersistError> {
        let lock = RunLock::acquire(dir)?;
        let store = PartialStore::new(dir, PARTIAL_PREFIX);
        let (checkpoint, state) =
            CheckpointLog::open(&dir.join(CHECKPOINT_FILE_NAME), fingerprint, resume)?;

        if !matches!(state, CheckpointState::Resumed { .. }) {
            let removed = store.remove_all()?;
            if removed > 0 {
                warn!(removed, "deleted stale partial batch files");
            }
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            batch_size: batch_size.max(1),
            store,
            checkpoint,
            state,
            _lock: lock,
        })
    }

    #[must_use]
    pub const fn state(&self) -> CheckpointState {
        self.state
    }

    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Checkpoint unit name for batch `seq`.
    #[must_use]
    pub fn unit_name(seq: usize) -> String {
        format!("batch-{seq:03}")
    }

    /// Number of batches `key_count` keys split into.
    #[must_use]
    pub const fn batch_count(&self, key_count: usize) -> usize {
        key_count.div_ceil(self.batch_size)
    }

    /// Whether batch `seq` can be skipped on this run.
    #[must_use]
    pub fn is_batch_done(&self, seq: usize) -> bool {
        self.checkpoint.is_complete(&Self::unit_name(seq)) && self.store.partial_path(seq).exists()
    }

    /// Write batch `seq` and record it in the checkpoint log.
    ///
    /// The partial file is durable before the checkpoint line is appended, so
    /// the log never names a batch whose rows are not on disk.
    ///
    /// # Errors
    ///
    /// Any [`PersistError`] from the partial write or the checkpoint append.
    pub fn write_batch<T: Serialize>(&mut self, seq: usize, rows: &[T]) -> Result<(), PersistError> {
        self.store.write(seq, rows)?;
        self.checkpoint.mark_complete(&Self::unit_name(seq))
    }

    /// Produce and persist rows for every key, batch by batch.
    ///
    /// `keys` must be in a deterministic order: batch membership is derived
    /// from position, and resumption relies on it being stable across runs.
    ///
    /// # Errors
    ///
    /// The first [`PersistError`] aborts the loop. Batches completed before
    /// it remain checkpointed.
    pub fn run<K, T, F>(&mut self, keys: &[K], mut produce: F) -> Result<BatchSummary, PersistError>
    where
        T: Serialize,
        F: FnMut(&K) -> T,
    {
        let batches = self.batch_count(keys.len());
        let mut summary = BatchSummary {
            batches,
            written: 0,
            skipped: 0,
            rows_written: 0,
        };

        for (idx, chunk) in keys.chunks(self.batch_size).enumerate() {
            let seq = idx + 1;
            if self.is_batch_done(seq) {
                summary.skipped += 1;
                continue;
            }

            let rows: Vec<T> = chunk.iter().map(&mut produce).collect();
            self.write_batch(seq, &rows)?;
            summary.written += 1;
            summary.rows_written += rows.len();

            let processed = (idx * self.batch_size + chunk.len()).min(keys.len());
            info!(
                batch = seq,
                batches,
                processed,
                total = keys.len(),
                percent = processed as f64 * 100.0 / keys.len() as f64,
                "batch saved"
            );
            log_memory(&Self::unit_name(seq));
        }

        if summary.skipped > 0 {
            info!(skipped = summary.skipped, "skipped batches completed by an earlier run");
        }
        Ok(summary)
    }

    /// Consolidate all batches into the final table, then remove partials and
    /// the checkpoint log.
    ///
    /// # Errors
    ///
    /// [`PersistError::Consolidation`] leaves partials and checkpoint intact
    /// so a rerun can retry.
    pub fn finish<T: Serialize + DeserializeOwned>(
        self,
        batches: usize,
    ) -> Result<(PathBuf, usize), PersistError> {
        let final_path = self.dir.join(FINAL_TABLE_NAME);
        let rows = self.store.consolidate::<T>(batches, &final_path)?;

        let removed = self.store.remove_all()?;
        self.checkpoint.remove()?;
        info!(removed, "removed partial batch files");

        Ok((final_path, rows))
    }
}
