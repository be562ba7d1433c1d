use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::common::RetentionConfig;

/// Time since `modified`. Timestamps in the future count as brand new.
pub fn file_age(modified: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or_default()
}

/// Deletes every regular file directly inside `dir` whose modification time
/// is more than `max_age` in the past. Returns how many were removed.
///
/// The first failure aborts the pass.
pub fn sweep_directory(dir: &Path, max_age: Duration) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let mut deleted = 0;

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let path = entry?.path();
        // follows symlinks, like a plain `is_file` check
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => continue,
        };

        let modified = metadata
            .modified()
            .with_context(|| format!("Failed to read mtime of {}", path.display()))?;
        if file_age(modified, now) > max_age {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to delete {}", path.display()))?;
            deleted += 1;
        }
    }

    if deleted > 0 {
        log::info!("Deleted {} old files from {}", deleted, dir.display());
    }
    Ok(deleted)
}

/// Sweeps `dir` every `config.interval` for the life of the process. The first
/// pass happens one interval after the call.
pub fn spawn_retention_task(dir: PathBuf, config: RetentionConfig) -> JoinHandle<()> {
    // tokio intervals must be non-zero
    let period = config.interval.max(Duration::from_millis(1));

    tokio::task::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let sweep_dir = dir.clone();
            let max_age = config.max_age;
            let result =
                tokio::task::spawn_blocking(move || sweep_directory(&sweep_dir, max_age)).await;

            match result {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => log::error!("Cleanup of {} failed: {:?}", dir.display(), e),
                Err(e) => log::error!("Cleanup task for {} panicked: {}", dir.display(), e),
            }
        }
    })
}
