//! Error types for the render pipeline.

use std::path::PathBuf;

use crate::scene::NodeId;

/// Failures of a single export attempt.
///
/// Every variant except [`ExportError::StyleRestoreSkipped`] is terminal for
/// the attempt. `StyleRestoreSkipped` is only ever reported as a cleanup
/// warning on an otherwise finished export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Post element not found: {element_id}")]
    ElementNotFound { element_id: String },

    #[error("Card {element_id} has no {missing}")]
    StructureInvalid {
        element_id: String,
        missing: &'static str,
    },

    #[error("Rasterization failed: {message}")]
    RasterizationFailed { message: String },

    #[error("Style restore skipped for detached node {node:?}")]
    StyleRestoreSkipped { node: NodeId },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Error raised by a [`crate::raster::Rasterizer`].
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RasterError {
    pub message: String,
}

impl RasterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<RasterError> for ExportError {
    fn from(err: RasterError) -> Self {
        Self::RasterizationFailed {
            message: err.message,
        }
    }
}

impl From<image::ImageError> for RasterError {
    fn from(err: image::ImageError) -> Self {
        Self::new(err.to_string())
    }
}

/// Failures resolving a background reference to pixels.
#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    #[error("Malformed data URL")]
    InvalidDataUrl,

    #[error("Failed to decode background image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to decode base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP error fetching background: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Background request to {url} returned {status}")]
    HttpStatus { url: String, status: u16 },
}
