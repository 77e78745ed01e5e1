//! Append-only checkpoint log of completed work units.
//!
//! # Format
//!
//! ```text
//! # collabnet-checkpoint v1 <fingerprint>
//! batch-001
//! batch-002
//! ```
//!
//! The header pins the log to one run fingerprint (graph, input rows,
//! result-affecting configuration and batch size). A log whose header does not match the
//! current fingerprint belongs to a different input snapshot and is reset.
//!
//! Each completed unit is appended as one line and fsynced before the caller
//! moves on, so after a crash the log lists exactly the units whose output was
//! confirmed on disk. A torn trailing line (crash mid-append) is truncated
//! away on open.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::PersistError;

const HEADER_PREFIX: &str = "# collabnet-checkpoint v1 ";

/// How an existing log was treated on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointState {
    /// No usable log existed; a new one was started.
    Fresh,
    /// A log for the same fingerprint was found and its units are honoured.
    Resumed { completed: usize },
    /// A log existed but was discarded (fingerprint mismatch or resume off).
    Discarded,
}

/// Open handle on a checkpoint log.
#[derive(Debug)]
pub struct CheckpointLog {
    path: PathBuf,
    file: File,
    completed: BTreeSet<String>,
}

impl CheckpointLog {
    /// Open (or create) the log at `path` for `fingerprint`.
    ///
    /// With `resume == false` any existing log is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Io`] if the log cannot be read, repaired or
    /// created.
    pub fn open(
        path: &Path,
        fingerprint: &str,
        resume: bool,
    ) -> Result<(Self, CheckpointState), PersistError> {
        let io_err = |source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut state = CheckpointState::Fresh;
        let mut completed = BTreeSet::new();

        if path.exists() {
            repair_torn_tail(path)?;
            let content = fs::read_to_string(path).map_err(io_err)?;
            let mut lines = content.lines();
            let header_matches = lines
                .next()
                .and_then(|h| h.strip_prefix(HEADER_PREFIX))
                .is_some_and(|fp| fp == fingerprint);

            if resume && header_matches {
                completed = lines
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect();
                state = CheckpointState::Resumed {
                    completed: completed.len(),
                };
                info!(path = %path.display(), completed = completed.len(), "resuming from checkpoint");
            } else {
                if resume {
                    warn!(path = %path.display(), "checkpoint belongs to a different run; discarding");
                }
                state = CheckpointState::Discarded;
            }
        }

        let file = if matches!(state, CheckpointState::Resumed { .. }) {
            OpenOptions::new().append(true).open(path).map_err(io_err)?
        } else {
            let mut file = File::create(path).map_err(io_err)?;
            writeln!(file, "{HEADER_PREFIX}{fingerprint}").map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
            file
        };

        Ok((
            Self {
                path: path.to_path_buf(),
                file,
                completed,
            },
            state,
        ))
    }

    #[must_use]
    pub fn is_complete(&self, unit: &str) -> bool {
        self.completed.contains(unit)
    }

    /// Durably record `unit` as complete.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Io`] if the append or fsync fails; the unit is
    /// then not considered complete.
    pub fn mark_complete(&mut self, unit: &str) -> Result<(), PersistError> {
        let io_err = |source| PersistError::Io {
            path: self.path.clone(),
            source,
        };
        writeln!(self.file, "{unit}").map_err(io_err)?;
        self.file.sync_data().map_err(io_err)?;
        self.completed.insert(unit.to_string());
        Ok(())
    }

    /// Delete the log after the run has been consolidated.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Io`] if the file cannot be removed.
    pub fn remove(self) -> Result<(), PersistError> {
        let Self { path, file, .. } = self;
        drop(file);
        fs::remove_file(&path).map_err(|source| PersistError::Io { path, source })
    }
}

/// Truncate an incomplete trailing line left by a crash mid-append.
///
/// Returns the number of bytes removed.
fn repair_torn_tail(path: &Path) -> Result<u64, PersistError> {
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };

    let content = fs::read(path).map_err(io_err)?;
    if content.is_empty() || content.last() == Some(&b'\n') {
        return Ok(0);
    }

    let truncate_to = content
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);
    let bytes_removed = (content.len() - truncate_to) as u64;

    let file = OpenOptions::new().write(true).open(path).map_err(io_err)?;
    file.set_len(truncate_to as u64).map_err(io_err)?;

    warn!(
        path = %path.display(),
        bytes_removed,
        "torn checkpoint write repaired: truncated incomplete trailing line"
    );

    Ok(bytes_removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_log_then_resume_with_same_fingerprint() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("checkpoint.log");

        let (mut log, state) = CheckpointLog::open(&path, "fp-1", true).expect("open");
        assert_eq!(state, CheckpointState::Fresh);
        log.mark_complete("batch-001").expect("mark");
        log.mark_complete("batch-002").expect("mark");
        drop(log);

        let (log, state) = CheckpointLog::open(&path, "fp-1", true).expect("reopen");
        assert_eq!(state, CheckpointState::Resumed { completed: 2 });
        assert!(log.is_complete("batch-001"));
        assert!(log.is_complete("batch-002"));
        assert!(!log.is_complete("batch-003"));
    }

    #[test]
    fn fingerprint_mismatch_discards_units() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("checkpoint.log");

        let (mut log, _) = CheckpointLog::open(&path, "fp-1", true).expect("open");
        log.mark_complete("batch-001").expect("mark");
        drop(log);

        let (log, state) = CheckpointLog::open(&path, "fp-2", true).expect("reopen");
        assert_eq!(state, CheckpointState::Discarded);
        assert!(!log.is_complete("batch-001"));

        let content = fs::read_to_string(&path).expect("read");
        assert_eq!(content, format!("{HEADER_PREFIX}fp-2\n"));
    }

    #[test]
    fn resume_disabled_discards_matching_log() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("checkpoint.log");

        let (mut log, _) = CheckpointLog::open(&path, "fp", true).expect("open");
        log.mark_complete("batch-001").expect("mark");
        drop(log);

        let (log, state) = CheckpointLog::open(&path, "fp", false).expect("reopen");
        assert_eq!(state, CheckpointState::Discarded);
        assert!(!log.is_complete("batch-001"));
    }

    #[test]
    fn torn_trailing_line_is_not_counted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("checkpoint.log");
        fs::write(&path, format!("{HEADER_PREFIX}fp\nbatch-001\nbatch-0")).expect("write");

        let (log, state) = CheckpointLog::open(&path, "fp", true).expect("open");
        assert_eq!(state, CheckpointState::Resumed { completed: 1 });
        assert!(log.is_complete("batch-001"));
        assert!(!log.is_complete("batch-0"));
    }

    #[test]
    fn remove_deletes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("checkpoint.log");
        let (log, _) = CheckpointLog::open(&path, "fp", true).expect("open");
        log.remove().expect("remove");
        assert!(!path.exists());
    }
}
