//! Error types for asset loading

use thiserror::Error;

/// Errors that can occur while reading assets
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported asset format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for reconview_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => reconview_core::Error::Io(e),
            IoError::UnsupportedFormat { format } => reconview_core::Error::UnsupportedFormat(format),
            other => reconview_core::Error::InvalidData(other.to_string()),
        }
    }
}
