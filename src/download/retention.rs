//! Retention of downloaded files.
//!
//! Two independent paths delete files from the download directory:
//! - a one-shot deferred deletion armed for each delivered file,
//! - a periodic sweep removing anything older than the retention window.
//!
//! Both treat an already missing file as success, since they race with each other
//! and with `/clean`.

use crate::core::config;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owns the retention policy of one download directory.
#[derive(Debug, Clone)]
pub struct RetentionManager {
    dir: PathBuf,
    delay: Duration,
    sweep_interval: Duration,
}

/// Removes `path`, treating "not found" as success.
///
/// Returns `true` when a file was actually removed.
pub async fn remove_if_exists(path: &Path) -> std::io::Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

impl RetentionManager {
    pub fn new(dir: impl Into<PathBuf>, delay: Duration, sweep_interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            delay,
            sweep_interval,
        }
    }

    /// Manager with the default window (2 minutes) and sweep interval (60 seconds)
    pub fn with_defaults(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, config::retention::delete_delay(), config::retention::sweep_interval())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms a one-shot deletion of `path` after the retention delay.
    pub fn schedule(&self, path: PathBuf) -> JoinHandle<()> {
        let delay = self.delay;
        log::debug!("🗑️ Scheduled deletion of {} in {}s", path.display(), delay.as_secs());

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match remove_if_exists(&path).await {
                Ok(true) => log::info!("🗑️ Deleted {}", path.display()),
                Ok(false) => {}
                Err(e) => log::warn!("Failed to delete {}: {}", path.display(), e),
            }
        })
    }

    /// Deletes every regular file in the directory whose mtime is older than the
    /// retention delay, measured from `now`. Never fails; returns how many files were removed.
    pub async fn sweep_once(&self, now: SystemTime) -> usize {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Sweep: cannot read {}: {}", self.dir.display(), e);
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    log::warn!("Sweep: error while listing {}: {}", self.dir.display(), e);
                    break;
                }
            };

            let path = entry.path();
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    if e.kind() != ErrorKind::NotFound {
                        log::warn!("Sweep: cannot stat {}: {}", path.display(), e);
                    }
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let age = metadata
                .modified()
                .ok()
                .and_then(|mtime| now.duration_since(mtime).ok())
                .unwrap_or(Duration::ZERO);
            if age <= self.delay {
                continue;
            }

            match remove_if_exists(&path).await {
                Ok(true) => {
                    log::info!("🧹 Sweep deleted {} (age {}s)", path.display(), age.as_secs());
                    removed += 1;
                }
                Ok(false) => {}
                Err(e) => log::warn!("Sweep: failed to delete {}: {}", path.display(), e),
            }
        }

        removed
    }

    /// Starts the recurring sweep. Runs until `cancel` fires.
    pub fn spawn_sweeper(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let manager = self.clone();
        log::info!(
            "Retention sweeper started for {} (every {}s, max age {}s)",
            manager.dir.display(),
            manager.sweep_interval.as_secs(),
            manager.delay.as_secs()
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(manager.sweep_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        log::info!("Retention sweeper stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        manager.sweep_once(SystemTime::now()).await;
                    }
                }
            }
        })
    }
}

/// File count and total bytes of the regular files directly inside `dir`.
pub async fn directory_usage(dir: &Path) -> std::io::Result<(usize, u64)> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut count = 0;
    let mut total = 0;
    while let Some(entry) = entries.next_entry().await? {
        if let Ok(metadata) = entry.metadata().await {
            if metadata.is_file() {
                count += 1;
                total += metadata.len();
            }
        }
    }
    Ok((count, total))
}

/// Deletes every regular file directly inside `dir`; returns how many were removed.
pub async fn purge_directory(dir: &Path) -> std::io::Result<usize> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.metadata().await.map(|m| m.is_file()).unwrap_or(false) {
            continue;
        }
        match remove_if_exists(&path).await {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(e) => log::warn!("Failed to delete {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}
