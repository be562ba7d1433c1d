use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 5] = ["png", "webp", "jpg", "jpeg", "gif"];

const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_PROCESSED_DIR: &str = "static/processed";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

const HOUR: Duration = Duration::from_secs(60 * 60);

/// Where uploads and processed images live, and what intake accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
    /// Reject unrecognised operation identifiers instead of copying the image.
    pub strict_operations: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            strict_operations: false,
        }
    }
}

impl StorageConfig {
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
        max_upload_bytes: usize,
        strict_operations: bool,
    ) -> Self {
        let config: StorageConfig = Self {
            upload_dir: upload_dir.into(),
            processed_dir: processed_dir.into(),
            max_upload_bytes,
            strict_operations,
            ..Default::default()
        };
        config
    }

    /// Creates both storage directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in self.dirs() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn dirs(&self) -> [&Path; 2] {
        [self.upload_dir.as_path(), self.processed_dir.as_path()]
    }
}

/// How often the retention sweep runs and how old a file must be to go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    pub interval: Duration,
    pub max_age: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            interval: 6 * HOUR,
            max_age: 24 * HOUR,
        }
    }
}

impl RetentionConfig {
    pub fn new(interval: Duration, max_age: Duration) -> Self {
        Self { interval, max_age }
    }
}
