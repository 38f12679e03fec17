//! Publishing errors.

use postcraft_common::error::PostcraftError;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Instagram {field} not configured (set POSTCRAFT_INSTAGRAM_{env} or the config file)")]
    NotConfigured {
        field: &'static str,
        env: &'static str,
    },

    #[error("Invalid Instagram {field} {value:?}: {reason}")]
    InvalidConfig {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Not authenticated with Instagram")]
    NotAuthenticated,

    #[error("Instagram authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Invalid callback URL: {0}")]
    InvalidCallback(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Instagram API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Store(#[from] PostcraftError),
}

pub type PublishResult<T> = Result<T, PublishError>;
