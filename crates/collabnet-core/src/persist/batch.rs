//! Partial batch files and their consolidation into the final table.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::PersistError;

/// Directory-scoped store of numbered partial CSV files.
#[derive(Debug, Clone)]
pub struct PartialStore {
    dir: PathBuf,
    prefix: String,
}

impl PartialStore {
    #[must_use]
    pub fn new(dir: &Path, prefix: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        }
    }

    /// Path of the partial file for batch `seq` (1-based).
    #[must_use]
    pub fn partial_path(&self, seq: usize) -> PathBuf {
        self.dir.join(format!("{}_{seq:03}.csv", self.prefix))
    }

    /// Write one batch atomically: temp file, fsync, rename.
    ///
    /// # Errors
    ///
    /// [`PersistError::PartialWrite`] if any step fails; no partial file for
    /// `seq` is left behind in that case.
    pub fn write<T: Serialize>(&self, seq: usize, rows: &[T]) -> Result<PathBuf, PersistError> {
        let path = self.partial_path(seq);
        let tmp = path.with_extension("csv.tmp");
        let fail = |reason: String| PersistError::PartialWrite {
            path: path.clone(),
            reason,
        };

        let result = write_csv_synced(&tmp, rows).and_then(|()| {
            fs::rename(&tmp, &path).map_err(|e| e.to_string())
        });
        if let Err(reason) = result {
            let _ = fs::remove_file(&tmp);
            return Err(fail(reason));
        }

        debug!(seq, rows = rows.len(), path = %path.display(), "partial batch written");
        Ok(path)
    }

    /// Read batch `seq` back.
    ///
    /// # Errors
    ///
    /// [`PersistError::Consolidation`] if the file is missing or malformed.
    pub fn read<T: DeserializeOwned>(&self, seq: usize) -> Result<Vec<T>, PersistError> {
        let path = self.partial_path(seq);
        let fail = |reason: String| PersistError::Consolidation {
            path: path.clone(),
            reason,
        };
        let file = File::open(&path).map_err(|e| fail(e.to_string()))?;
        csv::Reader::from_reader(file)
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| fail(e.to_string()))
    }

    /// Concatenate batches `1..=batches` in order into `final_path`.
    ///
    /// The final file is written atomically. Partials are left untouched;
    /// call [`PartialStore::remove_all`] once the result is confirmed.
    ///
    /// # Errors
    ///
    /// [`PersistError::Consolidation`] if any partial is missing or malformed,
    /// or the final table cannot be written.
    pub fn consolidate<T: Serialize + DeserializeOwned>(
        &self,
        batches: usize,
        final_path: &Path,
    ) -> Result<usize, PersistError> {
        let mut rows: Vec<T> = Vec::new();
        for seq in 1..=batches {
            rows.extend(self.read::<T>(seq)?);
        }

        let tmp = final_path.with_extension("csv.tmp");
        let result = write_csv_synced(&tmp, &rows)
            .and_then(|()| fs::rename(&tmp, final_path).map_err(|e| e.to_string()));
        if let Err(reason) = result {
            let _ = fs::remove_file(&tmp);
            return Err(PersistError::Consolidation {
                path: final_path.to_path_buf(),
                reason,
            });
        }

        info!(batches, rows = rows.len(), path = %final_path.display(), "consolidated partial batches");
        Ok(rows.len())
    }

    /// Delete every partial file carrying this store's prefix.
    ///
    /// Returns the number of files removed.
    ///
    /// # Errors
    ///
    /// [`PersistError::Io`] if the directory cannot be listed or a file
    /// cannot be removed.
    pub fn remove_all(&self) -> Result<usize, PersistError> {
        let io_err = |path: &Path, source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        };
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        let marker = format!("{}_", self.prefix);
        for entry in fs::read_dir(&self.dir).map_err(|e| io_err(&self.dir, e))? {
            let entry = entry.map_err(|e| io_err(&self.dir, e))?;
            let name = entry.file_name();
            let is_partial = name
                .to_str()
                .is_some_and(|n| n.starts_with(&marker) && (n.ends_with(".csv") || n.ends_with(".csv.tmp")));
            if is_partial {
                fs::remove_file(entry.path()).map_err(|e| io_err(&entry.path(), e))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn write_csv_synced<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row).map_err(|e| e.to_string())?;
    }
    let file = writer.into_inner().map_err(|e| e.to_string())?;
    file.sync_all().map_err(|e| e.to_string())
}
