use std::path::PathBuf;

/// Reasons an upload is refused before any processing happens.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("No file part")]
    MissingFile,
    #[error("No selected file")]
    NoSelectedFile,
    #[error("Invalid file type. Allowed: {}", allowed.join(", "))]
    DisallowedExtension { allowed: Vec<String> },
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
    #[error("Invalid filename")]
    InvalidFilename,
    #[error("failed to save upload to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IntakeError {
    /// True when the client sent something unacceptable, false when storing it failed.
    pub fn is_validation(&self) -> bool {
        !matches!(self, IntakeError::Io { .. })
    }
}
