use std::path::PathBuf;

use super::types::IntakeError;
use crate::common::{secure_filename, StorageConfig};

/// Lower-cased extension of a client filename, if it has one.
pub fn file_extension(filename: &str) -> Option<String> {
    let (_, extension) = filename.rsplit_once('.')?;
    Some(extension.to_lowercase())
}

/// Validates uploads and stores them in the configured upload directory.
#[derive(Debug, Clone)]
pub struct Intake {
    config: StorageConfig,
}

impl Intake {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn is_allowed_file(&self, filename: &str) -> bool {
        file_extension(filename)
            .map(|ext| self.config.allowed_extensions.contains(&ext))
            .unwrap_or(false)
    }

    fn check(&self, filename: &str, size: usize) -> Result<String, IntakeError> {
        if filename.is_empty() {
            return Err(IntakeError::NoSelectedFile);
        }
        if !self.is_allowed_file(filename) {
            return Err(IntakeError::DisallowedExtension {
                allowed: self.config.allowed_extensions.clone(),
            });
        }
        if size > self.config.max_upload_bytes {
            return Err(IntakeError::TooLarge {
                size,
                limit: self.config.max_upload_bytes,
            });
        }

        let safe_name = secure_filename(filename);
        if safe_name.is_empty() {
            return Err(IntakeError::InvalidFilename);
        }
        Ok(safe_name)
    }

    /// Writes `bytes` to the upload directory under the sanitised `filename`.
    /// An existing upload with the same name is overwritten.
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, IntakeError> {
        let safe_name = self.check(filename, bytes.len())?;
        let path = self.config.upload_dir.join(safe_name);

        std::fs::write(&path, bytes).map_err(|source| IntakeError::Io {
            path: path.clone(),
            source,
        })?;

        log::info!("Saved upload {:?} to {}", filename, path.display());
        Ok(path)
    }
}
