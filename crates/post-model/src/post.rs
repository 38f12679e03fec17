//! Post type and the text helpers derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single curated post card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique, stable identifier (UUID v4) for the session.
    pub id: String,

    /// Text rendered over the background.
    pub headline: String,

    /// Caption sent along with the image when publishing.
    pub caption: String,

    /// Hashtags without the leading `#`, in display order.
    #[serde(default)]
    pub hashtags: Vec<String>,

    /// Background reference: an http(s) URL, a data URL, or a local path.
    #[serde(rename = "backgroundImage")]
    pub background: String,

    #[serde(default)]
    pub favorited: bool,

    #[serde(default)]
    pub approved: bool,

    /// When the user asked for this post to go out, if scheduled.
    #[serde(default)]
    pub scheduled_time: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create an unflagged post with a fresh identifier.
    pub fn new(
        headline: impl Into<String>,
        caption: impl Into<String>,
        hashtags: Vec<String>,
        background: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            headline: headline.into(),
            caption: caption.into(),
            hashtags,
            background: background.into(),
            favorited: false,
            approved: false,
            scheduled_time: None,
            created_at,
        }
    }

    /// Element id under which this post's card is addressable for export.
    pub fn element_id(&self) -> String {
        card_element_id(&self.id)
    }

    /// Caption as published: caption, blank line, then `#tag` list.
    pub fn published_caption(&self) -> String {
        format_caption(&self.caption, &self.hashtags)
    }

    /// Download filename for an export taken at `timestamp_ms`.
    pub fn export_filename(&self, timestamp_ms: i64) -> String {
        export_filename(&self.headline, timestamp_ms)
    }
}

/// Element id of the card for the post with the given identifier.
pub fn card_element_id(post_id: &str) -> String {
    format!("post-{post_id}")
}

/// Build the caption text sent to Instagram.
pub fn format_caption(caption: &str, hashtags: &[String]) -> String {
    if hashtags.is_empty() {
        return caption.to_string();
    }
    let tags = hashtags
        .iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{caption}\n\n{tags}")
}

/// Derive a PNG filename from headline text.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`, then the timestamp
/// suffix keeps repeated exports of the same headline distinct.
pub fn export_filename(headline: &str, timestamp_ms: i64) -> String {
    let stem: String = headline
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}_{timestamp_ms}.png")
}
