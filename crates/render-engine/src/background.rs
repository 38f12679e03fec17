//! Resolution of card background references to pixels.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use image::DynamicImage;

use crate::error::BackgroundError;

/// Turns a background reference (URL, data URL or path) into an image.
#[async_trait::async_trait]
pub trait BackgroundLoader: Send + Sync {
    async fn load(&self, reference: &str) -> Result<DynamicImage, BackgroundError>;
}

/// Loader for `data:` URLs, `http(s)://` URLs, `file://` URLs and plain
/// filesystem paths.
#[derive(Debug, Clone)]
pub struct DefaultBackgroundLoader {
    client: reqwest::Client,
    /// Relative paths resolve against this directory.
    base_dir: Option<PathBuf>,
}

impl DefaultBackgroundLoader {
    pub fn new() -> Result<Self, BackgroundError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_dir: None,
        })
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    async fn fetch(&self, url: &str) -> Result<DynamicImage, BackgroundError> {
        tracing::debug!(url, "Fetching background");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackgroundError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        Ok(image::load_from_memory(&bytes)?)
    }

    async fn read_file(&self, path: &Path) -> Result<DynamicImage, BackgroundError> {
        let path = match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        };
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| BackgroundError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

#[async_trait::async_trait]
impl BackgroundLoader for DefaultBackgroundLoader {
    async fn load(&self, reference: &str) -> Result<DynamicImage, BackgroundError> {
        if reference.starts_with("data:") {
            return decode_data_url(reference);
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return self.fetch(reference).await;
        }
        let path = reference.strip_prefix("file://").unwrap_or(reference);
        self.read_file(Path::new(path)).await
    }
}

/// Decode a base64 `data:` URL into an image. The declared media type is
/// ignored; the format is sniffed from the payload.
pub fn decode_data_url(url: &str) -> Result<DynamicImage, BackgroundError> {
    let rest = url.strip_prefix("data:").ok_or(BackgroundError::InvalidDataUrl)?;
    let (meta, payload) = rest.split_once(',').ok_or(BackgroundError::InvalidDataUrl)?;
    if !meta.ends_with(";base64") {
        return Err(BackgroundError::InvalidDataUrl);
    }
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Encode PNG bytes as a data URL.
pub fn png_data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}
