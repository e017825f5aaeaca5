use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::{Error, Result};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Directory of `{file_name}.{timestamp}.bak` copies, created on first use.
#[derive(Debug, Clone)]
pub struct BackupStore {
    pub dir: PathBuf,
}

impl BackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        BackupStore { dir: dir.into() }
    }

    /// Stores `original` as the backup of `path`. Never overwrites an earlier
    /// backup; a counter is appended when the name is taken.
    pub fn backup(&self, path: impl AsRef<Path>, original: &str) -> Result<PathBuf> {
        let path = path.as_ref();
        let to_error = |source| Error::Backup { path: path.to_path_buf(), source };
        std::fs::create_dir_all(&self.dir).map_err(to_error)?;
        let file_name = crate::path_utils::display_name(path);
        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let backup_path = self.free_path(&file_name, &stamp);
        std::fs::write(&backup_path, original).map_err(to_error)?;
        tracing::debug!("backed up {path:?} to {backup_path:?}");
        Ok(backup_path)
    }

    fn free_path(&self, file_name: &str, stamp: &str) -> PathBuf {
        let first = self.dir.join(format!("{file_name}.{stamp}.bak"));
        if !first.exists() {
            return first
        }
        (1..)
            .map(|n| self.dir.join(format!("{file_name}.{stamp}.{n}.bak")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }
}

/// Backup-then-write for one file. The backup is taken from the in-memory
/// original, not from a fresh read of the file.
#[derive(Debug)]
pub struct WriteTransaction<'a> {
    store: &'a BackupStore,
    path: &'a Path,
    original: &'a str,
}

impl<'a> WriteTransaction<'a> {
    pub fn begin(store: &'a BackupStore, path: &'a Path, original: &'a str) -> Self {
        WriteTransaction { store, path, original }
    }

    /// Writes the backup, then `contents`. If the second write fails the
    /// original text is put back before the error is returned. Returns the
    /// backup path.
    pub fn commit(self, contents: &str) -> Result<PathBuf> {
        let backup_path = self.store.backup(self.path, self.original)?;
        if let Err(source) = std::fs::write(self.path, contents) {
            if let Err(restore_error) = std::fs::write(self.path, self.original) {
                tracing::warn!(
                    "could not restore {:?} after a failed write ({restore_error}); backup is at {backup_path:?}",
                    self.path,
                );
            }
            return Err(Error::Write { path: self.path.to_path_buf(), source })
        }
        Ok(backup_path)
    }
}
