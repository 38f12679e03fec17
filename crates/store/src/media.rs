//! Uploaded background media library.

use std::path::Path;

use base64::Engine;
use postcraft_common::clock::SharedClock;
use postcraft_common::error::{PostcraftError, PostcraftResult};
use postcraft_post_model::media::{MediaKind, UploadedMedia};

use crate::kv::SharedStore;

/// Storage key holding the JSON list of uploads, newest first.
pub const UPLOADED_BACKGROUNDS_KEY: &str = "uploaded_backgrounds";

/// Uploaded backgrounds, stored inline as data URLs.
#[derive(Clone)]
pub struct MediaLibrary {
    store: SharedStore,
    clock: SharedClock,
}

impl MediaLibrary {
    pub fn new(store: SharedStore, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// Store `bytes` as a new upload and put it first in the list.
    pub fn upload_media(
        &self,
        name: impl Into<String>,
        mime: &str,
        bytes: &[u8],
    ) -> PostcraftResult<UploadedMedia> {
        let now = self.clock.now();
        let media = UploadedMedia {
            id: media_id(now.timestamp_millis()),
            url: format!(
                "data:{mime};base64,{}",
                base64::engine::general_purpose::STANDARD.encode(bytes)
            ),
            kind: MediaKind::from_mime(mime),
            name: name.into(),
            uploaded_at: now,
        };

        let mut all = self.uploaded_media()?;
        all.insert(0, media.clone());
        self.save(&all)?;

        tracing::info!(id = %media.id, name = %media.name, kind = ?media.kind, "Uploaded media");
        Ok(media)
    }

    /// Upload a file from disk, guessing the media type from its extension.
    pub fn upload_file(&self, path: &Path) -> PostcraftResult<UploadedMedia> {
        if !path.exists() {
            return Err(PostcraftError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.upload_media(name, mime_for_path(path), &bytes)
    }

    /// All uploads, newest first. An unreadable list is treated as empty.
    pub fn uploaded_media(&self) -> PostcraftResult<Vec<UploadedMedia>> {
        let Some(raw) = self.store.get_item(UPLOADED_BACKGROUNDS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load uploaded media");
                Ok(Vec::new())
            }
        }
    }

    /// Remove the upload with `id`. Unknown ids are ignored.
    pub fn delete_media(&self, id: &str) -> PostcraftResult<()> {
        let mut all = self.uploaded_media()?;
        all.retain(|m| m.id != id);
        self.save(&all)
    }

    pub fn media_by_id(&self, id: &str) -> PostcraftResult<Option<UploadedMedia>> {
        Ok(self.uploaded_media()?.into_iter().find(|m| m.id == id))
    }

    /// Data URLs of image uploads, newest first.
    pub fn background_urls(&self) -> PostcraftResult<Vec<String>> {
        Ok(self
            .uploaded_media()?
            .into_iter()
            .filter(UploadedMedia::is_image)
            .map(|m| m.url)
            .collect())
    }

    pub fn clear_all(&self) -> PostcraftResult<()> {
        self.store.remove_item(UPLOADED_BACKGROUNDS_KEY)
    }

    fn save(&self, all: &[UploadedMedia]) -> PostcraftResult<()> {
        let json = serde_json::to_string(all)?;
        self.store.set_item(UPLOADED_BACKGROUNDS_KEY, &json)
    }
}

/// `media_{ms}_{9 lowercase alphanumerics}`.
fn media_id(timestamp_ms: i64) -> String {
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("media_{timestamp_ms}_{suffix}")
}

/// Media type for a file name, by extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_id_shape() {
        let id = media_id(1_700_000_000_000);
        let suffix = id.strip_prefix("media_1700000000000_").unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("clip.mov")), "video/quicktime");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }
}
