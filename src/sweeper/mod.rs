//! Retention sweeper for upload batches.
//!
//! A background task that periodically walks the storage root and removes
//! expired content:
//! - whole batch directories older than the directory TTL
//! - individual files older than the file TTL
//! - batch directories left empty afterwards
//!
//! Batches touched by a request within the busy grace window are left alone
//! for the current cycle.

mod fs;

pub use fs::{EntryMeta, LocalFs, SweepFs};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::RetentionConfig;
use crate::storage::ActivityTracker;
use crate::{Result, StationError};

/// Period used when the configured interval is zero.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Age limits and timing for the sweeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Files older than this are removed.
    pub file_ttl: Duration,
    /// Batch directories older than this are removed with their content.
    pub directory_ttl: Duration,
    /// Time between cycles. Zero falls back to [`MIN_SWEEP_INTERVAL`].
    pub interval: Duration,
    /// Batches accessed within this window are skipped.
    pub busy_grace: Duration,
}

impl From<&RetentionConfig> for RetentionPolicy {
    fn from(config: &RetentionConfig) -> Self {
        Self {
            file_ttl: config.file_ttl(),
            directory_ttl: config.directory_ttl(),
            interval: config.sweep_interval(),
            busy_grace: config.busy_grace(),
        }
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::from(&RetentionConfig::default())
    }
}

/// Outcome of a single sweep cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Batch directories removed because they exceeded the directory TTL.
    pub directories_expired: usize,
    /// Files removed because they exceeded the file TTL.
    pub files_expired: usize,
    /// Batch directories removed because nothing was left in them.
    pub empty_directories_removed: usize,
    /// Batch directories skipped because they were recently accessed.
    pub skipped_busy: usize,
    /// Entries that could not be inspected or removed.
    pub errors: usize,
}

impl SweepReport {
    /// Total number of removed entries.
    pub fn removed(&self) -> usize {
        self.directories_expired + self.files_expired + self.empty_directories_removed
    }
}

/// Periodic cleaner of the upload storage root.
#[derive(Clone)]
pub struct RetentionSweeper {
    root: PathBuf,
    policy: RetentionPolicy,
    activity: Option<Arc<ActivityTracker>>,
    fs: Arc<dyn SweepFs>,
}

impl RetentionSweeper {
    /// Create a sweeper for the batches under `root`.
    pub fn new(root: impl Into<PathBuf>, policy: RetentionPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
            activity: None,
            fs: Arc::new(LocalFs),
        }
    }

    /// Skip batches recently touched according to `activity`.
    pub fn with_activity(mut self, activity: Arc<ActivityTracker>) -> Self {
        self.activity = Some(activity);
        self
    }

    /// Use a different filesystem implementation.
    pub fn with_fs(mut self, fs: Arc<dyn SweepFs>) -> Self {
        self.fs = fs;
        self
    }

    /// Get the retention policy.
    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Run one cycle, measuring ages against `now`.
    ///
    /// Per-entry failures are logged and counted in the report. Only a
    /// failure to list the storage root is returned as an error.
    pub fn sweep_once(&self, now: SystemTime) -> Result<SweepReport> {
        let entries = self.fs.list(&self.root).map_err(|e| {
            StationError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to list {}: {e}", self.root.display()),
            ))
        })?;

        let mut report = SweepReport::default();

        for path in entries {
            let meta = match self.fs.stat(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to stat entry");
                    report.errors += 1;
                    continue;
                }
            };
            if !meta.is_dir {
                continue;
            }

            let name = batch_name(&path);
            if self.is_busy(&name) {
                debug!(directory = %name, "Skipping recently accessed directory");
                report.skipped_busy += 1;
                continue;
            }

            if age(now, meta.modified) > self.policy.directory_ttl {
                match self.fs.remove_dir_all(&path) {
                    Ok(()) => {
                        info!(directory = %name, "Removed expired directory");
                        report.directories_expired += 1;
                        self.forget(&name);
                    }
                    Err(e) => {
                        warn!(directory = %name, error = %e, "Failed to remove expired directory");
                        report.errors += 1;
                    }
                }
                continue;
            }

            if !self.sweep_files(&path, now, &mut report) {
                continue;
            }

            match self.fs.list(&path) {
                Ok(rest) if rest.is_empty() => match self.fs.remove_dir(&path) {
                    Ok(()) => {
                        info!(directory = %name, "Removed empty directory");
                        report.empty_directories_removed += 1;
                        self.forget(&name);
                    }
                    Err(e) => {
                        warn!(directory = %name, error = %e, "Failed to remove empty directory");
                        report.errors += 1;
                    }
                },
                Ok(_) => {}
                Err(e) => {
                    warn!(directory = %name, error = %e, "Failed to re-list directory");
                    report.errors += 1;
                }
            }
        }

        if let Some(activity) = &self.activity {
            activity.prune(self.policy.busy_grace);
        }

        Ok(report)
    }

    /// Remove expired files directly inside `dir`. Subdirectories are left alone.
    ///
    /// Returns false if `dir` could not be listed.
    fn sweep_files(&self, dir: &Path, now: SystemTime, report: &mut SweepReport) -> bool {
        let files = match self.fs.list(dir) {
            Ok(files) => files,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Failed to list directory");
                report.errors += 1;
                return false;
            }
        };

        for file in files {
            let meta = match self.fs.stat(&file) {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "Failed to stat file");
                    report.errors += 1;
                    continue;
                }
            };
            if meta.is_dir || age(now, meta.modified) <= self.policy.file_ttl {
                continue;
            }

            match self.fs.remove_file(&file) {
                Ok(()) => {
                    debug!(path = %file.display(), "Removed expired file");
                    report.files_expired += 1;
                }
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "Failed to remove expired file");
                    report.errors += 1;
                }
            }
        }
        true
    }

    fn is_busy(&self, name: &str) -> bool {
        self.activity
            .as_ref()
            .is_some_and(|a| a.touched_within(name, self.policy.busy_grace))
    }

    fn forget(&self, name: &str) {
        if let Some(activity) = &self.activity {
            activity.forget(name);
        }
    }

    /// Run cycles until `cancel` turns true.
    ///
    /// The first cycle starts immediately. Each cycle runs on the blocking
    /// pool and is awaited, so cycles never overlap and a cancellation
    /// received mid-cycle takes effect once the cycle has finished.
    pub async fn run(self, mut cancel: watch::Receiver<bool>) {
        info!(
            root = %self.root.display(),
            file_ttl_secs = self.policy.file_ttl.as_secs(),
            directory_ttl_secs = self.policy.directory_ttl.as_secs(),
            interval_secs = self.policy.interval.as_secs(),
            "Retention sweeper started"
        );

        let period = if self.policy.interval.is_zero() {
            warn!(
                fallback_secs = MIN_SWEEP_INTERVAL.as_secs(),
                "Sweep interval is zero; using fallback"
            );
            MIN_SWEEP_INTERVAL
        } else {
            self.policy.interval
        };

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *cancel.borrow() {
                break;
            }

            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            self.run_cycle().await;
        }

        info!("Retention sweeper stopped");
    }

    /// Spawn [`run`](Self::run) as a background task.
    pub fn spawn(self, cancel: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    async fn run_cycle(&self) {
        let sweeper = self.clone();
        let now = SystemTime::now();

        match tokio::task::spawn_blocking(move || sweeper.sweep_once(now)).await {
            Ok(Ok(report)) => {
                if report.removed() > 0 || report.errors > 0 {
                    info!(
                        directories_expired = report.directories_expired,
                        files_expired = report.files_expired,
                        empty_directories_removed = report.empty_directories_removed,
                        skipped_busy = report.skipped_busy,
                        errors = report.errors,
                        "Retention sweep completed"
                    );
                } else {
                    debug!(skipped_busy = report.skipped_busy, "Nothing to sweep");
                }
            }
            Ok(Err(e)) => error!(error = %e, "Retention sweep failed"),
            Err(e) => error!(error = %e, "Retention sweep task panicked"),
        }
    }
}

impl std::fmt::Debug for RetentionSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionSweeper")
            .field("root", &self.root)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Age of an entry; a modification time in the future counts as zero.
fn age(now: SystemTime, modified: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or(Duration::ZERO)
}

fn batch_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
