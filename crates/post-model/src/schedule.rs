//! Publish/schedule requests and locally tracked scheduled posts.
//!
//! Instagram's API cannot defer a publish, so scheduling only records the
//! intent next to the media container that was created for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::post::format_caption;

/// Lifecycle of a locally tracked scheduled post.
///
/// Postcraft only ever writes `Scheduled`; cancelling removes the record.
/// `Published` and `Cancelled` are read-only states that records written by
/// other tools sharing the store may carry, and are skipped when listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Scheduled,
    Published,
    Cancelled,
}

/// Scheduled-post record as kept in local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPost {
    /// Same value as `media_container_id`.
    pub id: String,
    pub post_id: String,
    pub scheduled_time: DateTime<Utc>,
    pub media_container_id: String,
    pub status: ScheduleStatus,
}

impl ScheduledPost {
    /// A fresh record for a container created for `post_id`.
    pub fn new(post_id: impl Into<String>, container_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        let container_id = container_id.into();
        Self {
            id: container_id.clone(),
            post_id: post_id.into(),
            scheduled_time: at,
            media_container_id: container_id,
            status: ScheduleStatus::Scheduled,
        }
    }
}

/// Request to create a media container and remember it for later.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRequest {
    pub post_id: String,
    pub scheduled_time: DateTime<Utc>,
    pub image_url: String,
    pub caption: String,
    pub hashtags: Vec<String>,
}

/// Request to create a media container and publish it immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    pub post_id: String,
    pub image_url: String,
    pub caption: String,
    pub hashtags: Vec<String>,
}

impl ScheduleRequest {
    pub fn full_caption(&self) -> String {
        format_caption(&self.caption, &self.hashtags)
    }
}

impl PublishRequest {
    pub fn full_caption(&self) -> String {
        format_caption(&self.caption, &self.hashtags)
    }
}
