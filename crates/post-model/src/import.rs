//! Import batch format.
//!
//! An import file is a JSON array of `{ headline, caption, hashtags? }`
//! records. Validation is all-or-nothing: the first bad record fails the
//! whole batch and no posts are created.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One validated record from an import batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpload {
    pub headline: String,
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// Errors raised while reading an import batch.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Please upload a JSON file: {path}")]
    NotJson { path: PathBuf },

    #[error("JSON must contain an array of posts")]
    NotAnArray,

    /// `index` is 1-based, matching what the user sees in their file.
    #[error("Post {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("Post {index} has an invalid `{field}`: {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Parse and validate an import batch.
pub fn parse_import(json: &str) -> Result<Vec<PostUpload>, ImportError> {
    let value: Value = serde_json::from_str(json)?;
    let records = value.as_array().ok_or(ImportError::NotAnArray)?;

    records
        .iter()
        .enumerate()
        .map(|(i, record)| parse_record(i + 1, record))
        .collect()
}

/// Read an import batch from disk. Only `.json` files are accepted.
pub fn load_import_file(path: impl AsRef<Path>) -> Result<Vec<PostUpload>, ImportError> {
    let path = path.as_ref();
    let is_json = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".json"));
    if !is_json {
        return Err(ImportError::NotJson {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ImportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let uploads = parse_import(&content)?;
    tracing::debug!(path = %path.display(), count = uploads.len(), "Loaded import batch");
    Ok(uploads)
}

fn parse_record(index: usize, record: &Value) -> Result<PostUpload, ImportError> {
    let headline = required_text(index, record, "headline")?;
    let caption = required_text(index, record, "caption")?;

    let hashtags = match record.get("hashtags") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ImportError::InvalidField {
                        index,
                        field: "hashtags",
                        reason: format!("expected string entries, found {item}"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(ImportError::InvalidField {
                index,
                field: "hashtags",
                reason: format!("expected an array, found {other}"),
            })
        }
    };

    Ok(PostUpload {
        headline,
        caption,
        hashtags,
    })
}

/// Missing, null, and empty values all count as absent.
fn required_text(index: usize, record: &Value, field: &'static str) -> Result<String, ImportError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(ImportError::MissingField { index, field }),
        Some(Value::String(s)) if s.is_empty() => Err(ImportError::MissingField { index, field }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ImportError::InvalidField {
            index,
            field,
            reason: format!("expected a string, found {other}"),
        }),
    }
}
