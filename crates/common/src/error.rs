//! Error types shared across Postcraft crates.

use std::path::PathBuf;

/// Top-level error type for Postcraft operations.
#[derive(Debug, thiserror::Error)]
pub enum PostcraftError {
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using PostcraftError.
pub type PostcraftResult<T> = Result<T, PostcraftError>;

impl PostcraftError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage {
            message: msg.into(),
        }
    }
}
