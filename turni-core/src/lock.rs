//! Advisory file locks on the data directory.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{TurniError, TurniResult};

/// Holds an exclusive lock until dropped.
pub struct DirLock {
    file: File,
    path: PathBuf,
}

impl DirLock {
    /// Block until the lock at `path` is ours.
    pub fn exclusive(path: impl AsRef<Path>) -> TurniResult<Self> {
        let (file, path) = open(path.as_ref())?;
        file.lock_exclusive()
            .map_err(|e| TurniError::Store(format!("Could not lock {}: {e}", path.display())))?;
        Ok(DirLock { file, path })
    }

    /// Take the lock only if nobody else holds it.
    pub fn try_exclusive(path: impl AsRef<Path>) -> TurniResult<Option<Self>> {
        let (file, path) = open(path.as_ref())?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(DirLock { file, path })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(TurniError::Store(format!("Could not lock {}: {e}", path.display()))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn open(path: &Path) -> TurniResult<(File, PathBuf)> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    Ok((file, path.to_path_buf()))
}
