//! Uploaded background media records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of uploaded media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Anything that is not `image/*` is treated as video.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            Self::Image
        } else {
            Self::Video
        }
    }
}

/// A user-uploaded background, stored inline as a data URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    /// `media_{unix ms}_{9 random chars}`.
    pub id: String,

    /// `data:{mime};base64,...`
    pub url: String,

    #[serde(rename = "type")]
    pub kind: MediaKind,

    /// Original file name.
    pub name: String,

    pub uploaded_at: DateTime<Utc>,
}

impl UploadedMedia {
    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(MediaKind::from_mime("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("application/octet-stream"), MediaKind::Video);
    }

    #[test]
    fn test_record_serializes_type_field() {
        let media = UploadedMedia {
            id: "media_1_abc".to_string(),
            url: "data:image/png;base64,AAAA".to_string(),
            kind: MediaKind::Image,
            name: "leaf.png".to_string(),
            uploaded_at: Utc::now(),
        };
        let value = serde_json::to_value(&media).unwrap();
        assert_eq!(value["type"], "image");
        assert!(value.get("uploadedAt").is_some());
    }
}
