use fs2::FileExt;
use std::{
    fs::{self, File, OpenOptions},
    path::Path,
};

use super::PersistError;

/// Exclusive advisory lock over an output directory.
///
/// Held for the lifetime of a run so two processes never interleave partial
/// files or checkpoint appends in the same directory. Released on drop.
#[derive(Debug)]
pub struct RunLock {
    file: File,
}

impl RunLock {
    /// Lock file name created inside the output directory.
    pub const FILE_NAME: &'static str = ".collabnet.lock";

    /// Try to take the lock without waiting.
    ///
    /// # Errors
    ///
    /// [`PersistError::Locked`] when another process holds the lock, or
    /// [`PersistError::Io`] when the lock file cannot be created.
    pub fn acquire(dir: &Path) -> Result<Self, PersistError> {
        fs::create_dir_all(dir).map_err(|source| PersistError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(Self::FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| PersistError::Io {
                path: path.clone(),
                source,
            })?;

        if file.try_lock_exclusive().is_err() {
            return Err(PersistError::Locked { path });
        }

        Ok(Self { file })
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
