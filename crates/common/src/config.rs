//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding local key-value storage (uploaded backgrounds,
    /// credentials, scheduled-post records).
    pub data_dir: PathBuf,

    /// Default export rendering settings.
    #[serde(default)]
    pub render: RenderDefaults,

    /// Instagram application credentials and endpoints.
    #[serde(default)]
    pub instagram: InstagramConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default export rendering parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Pixel density multiplier applied at capture.
    pub pixel_ratio: u32,

    /// Wait before capture after export styles are applied.
    pub settle_delay_ms: u64,

    /// TrueType/OpenType font used for headline text.
    pub font_path: Option<PathBuf>,

    /// Directory where downloaded images are written.
    pub output_dir: PathBuf,
}

/// Instagram Graph API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstagramConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    /// OAuth redirect target registered with the Instagram app.
    pub redirect_uri: String,

    /// Base URL for the OAuth authorize/token endpoints.
    pub auth_base_url: String,

    /// Base URL for Graph API calls.
    pub graph_base_url: String,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "postcraft=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs_default_data(),
            render: RenderDefaults::default(),
            instagram: InstagramConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            pixel_ratio: 2,
            settle_delay_ms: 0,
            font_path: None,
            output_dir: PathBuf::from("exports"),
        }
    }
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: "http://localhost:5173/auth/instagram/callback".to_string(),
            auth_base_url: "https://api.instagram.com".to_string(),
            graph_base_url: "https://graph.instagram.com".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl InstagramConfig {
    /// Overlay credentials from `POSTCRAFT_INSTAGRAM_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Overlay credentials from an arbitrary variable lookup.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup("POSTCRAFT_INSTAGRAM_CLIENT_ID").filter(|v| !v.is_empty()) {
            self.client_id = Some(id);
        }
        if let Some(secret) =
            lookup("POSTCRAFT_INSTAGRAM_CLIENT_SECRET").filter(|v| !v.is_empty())
        {
            self.client_secret = Some(secret);
        }
        if let Some(uri) = lookup("POSTCRAFT_INSTAGRAM_REDIRECT_URI").filter(|v| !v.is_empty()) {
            self.redirect_uri = uri;
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    /// Instagram credentials from the environment always win.
    pub fn load() -> Self {
        let config_path = config_file_path();
        let mut config = Self::default();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(parsed) => config = parsed,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        config.instagram.apply_env_overrides();
        config
    }

    /// Path of the local key-value storage file.
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("postcraft").join("config.json")
}

/// Default data directory.
fn dirs_default_data() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("postcraft")
}
