//! Upload batch storage for imgstation.
//!
//! Uploads are grouped into batch directories directly under the storage
//! root, named after the local time at which the batch was created:
//! ```text
//! {root}/
//! ├── 0314-0930/
//! │   ├── IMG_0001.jpg
//! │   └── IMG_0002.jpg
//! └── 0314-1415/
//!     └── scan.pdf
//! ```
//! Every access is recorded in the [`ActivityTracker`] so the retention
//! sweeper can leave busy batches alone.

mod activity;

pub use activity::ActivityTracker;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::{Result, StationError};

/// Maximum length of a batch or file name in bytes.
pub const MAX_SEGMENT_LENGTH: usize = 255;

/// Format of batch directory names (`MMDD-HHMM`).
pub const BATCH_NAME_FORMAT: &str = "%m%d-%H%M";

/// A file read back from a batch.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// File name inside the batch.
    pub name: String,
    /// File content.
    pub content: Vec<u8>,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Filesystem-backed store of upload batches.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    activity: Arc<ActivityTracker>,
}

impl UploadStore {
    /// Create a store rooted at `root`.
    ///
    /// The root directory will be created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            activity: Arc::new(ActivityTracker::new()),
        })
    }

    /// Use a shared activity tracker.
    pub fn with_activity(mut self, activity: Arc<ActivityTracker>) -> Self {
        self.activity = activity;
        self
    }

    /// Get the storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the activity tracker shared with the sweeper.
    pub fn activity(&self) -> Arc<ActivityTracker> {
        Arc::clone(&self.activity)
    }

    /// Create a new batch named after `now`.
    ///
    /// Returns the batch name. Fails with `Conflict` if a batch with that
    /// name already exists.
    ///
    /// The batch is marked active before its directory appears, so the
    /// sweeper never sees it empty and idle.
    pub fn create_batch(&self, now: DateTime<Local>) -> Result<String> {
        let name = now.format(BATCH_NAME_FORMAT).to_string();
        self.activity.touch(&name);

        match fs::create_dir(self.root.join(&name)) {
            Ok(()) => Ok(name),
            // The existing batch keeps its fresh mark
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(StationError::Conflict(format!("directory {name}")))
            }
            Err(e) => {
                self.activity.forget(&name);
                Err(e.into())
            }
        }
    }

    /// Rename a batch.
    pub fn rename_batch(&self, old: &str, new: &str) -> Result<()> {
        let from = self.batch_path(old)?;
        let to = self.batch_path(new)?;

        if !from.is_dir() {
            return Err(StationError::NotFound(format!("directory {old}")));
        }
        if to.exists() {
            return Err(StationError::Conflict(format!("directory {new}")));
        }

        fs::rename(&from, &to)?;
        self.activity.rename(old, new);
        Ok(())
    }

    /// Delete a batch and everything in it.
    pub fn delete_batch(&self, name: &str) -> Result<()> {
        let path = self.existing_batch(name)?;
        fs::remove_dir_all(&path)?;
        self.activity.forget(name);
        Ok(())
    }

    /// List batch names, newest first.
    pub fn list_batches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// List the file names inside a batch in ascending order.
    pub fn list_files(&self, batch: &str) -> Result<Vec<String>> {
        let path = self.existing_batch(batch)?;

        let mut names = Vec::new();
        for entry in fs::read_dir(&path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        names.sort_unstable();
        self.activity.touch(batch);
        Ok(names)
    }

    /// Save an uploaded file into a batch.
    ///
    /// The file is stored under the base name of `original_name`; any
    /// directory part sent by the client is dropped. An existing file with
    /// the same name is overwritten. Returns the stored name.
    pub fn save_file(&self, batch: &str, original_name: &str, content: &[u8]) -> Result<String> {
        let dir = self.existing_batch(batch)?;
        let name = base_name(original_name);
        validate_segment("file name", name)?;

        fs::write(dir.join(name), content)?;
        self.activity.touch(batch);
        Ok(name.to_string())
    }

    /// Read a file from a batch.
    pub fn read_file(&self, batch: &str, name: &str) -> Result<StoredFile> {
        let path = self.file_path(batch, name)?;

        let metadata = match fs::metadata(&path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(StationError::NotFound(format!("file {name}"))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StationError::NotFound(format!("file {name}")));
            }
            Err(e) => return Err(e.into()),
        };
        let content = fs::read(&path)?;

        self.activity.touch(batch);
        Ok(StoredFile {
            name: name.to_string(),
            content,
            modified: metadata.modified()?,
        })
    }

    /// Delete a file from a batch.
    pub fn delete_file(&self, batch: &str, name: &str) -> Result<()> {
        let path = self.file_path(batch, name)?;

        match fs::symlink_metadata(&path) {
            Ok(m) if m.is_file() => {}
            Ok(_) => return Err(StationError::NotFound(format!("file {name}"))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StationError::NotFound(format!("file {name}")));
            }
            Err(e) => return Err(e.into()),
        }

        fs::remove_file(&path)?;
        self.activity.touch(batch);
        Ok(())
    }

    /// Path of a batch directory after validating its name.
    fn batch_path(&self, name: &str) -> Result<PathBuf> {
        validate_segment("directory name", name)?;
        Ok(self.root.join(name))
    }

    /// Path of a batch directory that must already exist.
    fn existing_batch(&self, name: &str) -> Result<PathBuf> {
        let path = self.batch_path(name)?;
        if !path.is_dir() {
            return Err(StationError::NotFound(format!("directory {name}")));
        }
        Ok(path)
    }

    /// Path of a file inside an existing batch.
    fn file_path(&self, batch: &str, name: &str) -> Result<PathBuf> {
        validate_segment("file name", name)?;
        Ok(self.existing_batch(batch)?.join(name))
    }
}

/// Strip any client-supplied directory part from an upload name.
fn base_name(original_name: &str) -> &str {
    original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name)
}

/// Check that `value` is usable as a single path segment.
pub fn validate_segment(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(StationError::Validation(format!("{kind} is empty")));
    }
    if value.len() > MAX_SEGMENT_LENGTH {
        return Err(StationError::Validation(format!(
            "{kind} must be at most {MAX_SEGMENT_LENGTH} bytes"
        )));
    }
    if value == "." || value == ".." {
        return Err(StationError::Validation(format!("{kind} is invalid")));
    }
    if value
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(StationError::Validation(format!(
            "{kind} contains invalid characters"
        )));
    }
    Ok(())
}
