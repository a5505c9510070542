//! Error types for reconview

use std::path::PathBuf;
use thiserror::Error;

/// Boxed underlying cause carried by load failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for reconview operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to load {path}: {message}")]
    Load {
        path: PathBuf,
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("A load is already in flight")]
    LoadInFlight,

    #[error("Load of {path} was issued by another viewer")]
    ForeignLoad { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap any failure as a load error for `path`
    pub fn load<P, E>(path: P, message: impl Into<String>, source: E) -> Self
    where
        P: Into<PathBuf>,
        E: Into<BoxError>,
    {
        Error::Load {
            path: path.into(),
            message: message.into(),
            source: source.into(),
        }
    }
}

/// Result type alias for reconview operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_load_error_keeps_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "missing mesh.glb");
        let err = Error::load("static/gallery/dino/mesh.glb", "file could not be read", cause);

        assert_eq!(
            err.to_string(),
            "Failed to load static/gallery/dino/mesh.glb: file could not be read"
        );
        let source = err.source().expect("load error should expose its cause");
        assert_eq!(source.to_string(), "missing mesh.glb");
    }
}
