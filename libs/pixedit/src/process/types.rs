use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),
}
