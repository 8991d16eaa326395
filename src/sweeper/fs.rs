//! Filesystem operations used by the retention sweeper.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::warn;

/// Metadata of a single entry, read without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    /// Whether the entry itself is a directory.
    pub is_dir: bool,
    /// Last modification time.
    pub modified: SystemTime,
}

/// The filesystem surface the sweeper needs.
pub trait SweepFs: Send + Sync {
    /// List the entries directly inside `dir`.
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Stat `path` without following symlinks.
    fn stat(&self, path: &Path) -> io::Result<EntryMeta>;

    /// Remove a directory and everything below it.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Remove a single non-directory entry.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// [`SweepFs`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl SweepFs for LocalFs {
    /// Entries that fail to read are logged and left out.
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir)?.map(|entry| entry.map(|e| e.path()));
        Ok(readable_entries(dir, entries))
    }

    fn stat(&self, path: &Path) -> io::Result<EntryMeta> {
        let metadata = fs::symlink_metadata(path)?;
        Ok(EntryMeta {
            is_dir: metadata.is_dir(),
            modified: metadata.modified()?,
        })
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Keep the readable entries of a listing of `dir`.
fn readable_entries(
    dir: &Path,
    entries: impl Iterator<Item = io::Result<PathBuf>>,
) -> Vec<PathBuf> {
    entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                None
            }
        })
        .collect()
}
