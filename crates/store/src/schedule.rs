//! Locally tracked scheduled posts.

use postcraft_common::error::PostcraftResult;
use postcraft_post_model::schedule::{ScheduleStatus, ScheduledPost};

use crate::kv::SharedStore;

pub const SCHEDULED_POSTS_KEY: &str = "scheduled_posts";

/// Append-only list of scheduled posts with removal on cancel.
#[derive(Clone)]
pub struct ScheduleLedger {
    store: SharedStore,
}

impl ScheduleLedger {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn record(&self, entry: ScheduledPost) -> PostcraftResult<()> {
        let mut all = self.all()?;
        tracing::debug!(id = %entry.id, post_id = %entry.post_id, "Recording scheduled post");
        all.push(entry);
        self.save(&all)
    }

    /// Entries still waiting to go out.
    pub fn scheduled(&self) -> PostcraftResult<Vec<ScheduledPost>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|p| p.status == ScheduleStatus::Scheduled)
            .collect())
    }

    /// Drop the entry with `id`. Returns whether anything was removed.
    pub fn cancel(&self, id: &str) -> PostcraftResult<bool> {
        let mut all = self.all()?;
        let before = all.len();
        all.retain(|p| p.id != id);
        let removed = all.len() != before;
        if removed {
            self.save(&all)?;
        }
        Ok(removed)
    }

    /// Every entry regardless of status. A missing key is an empty list.
    pub fn all(&self) -> PostcraftResult<Vec<ScheduledPost>> {
        match self.store.get_item(SCHEDULED_POSTS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, all: &[ScheduledPost]) -> PostcraftResult<()> {
        self.store
            .set_item(SCHEDULED_POSTS_KEY, &serde_json::to_string(all)?)
    }
}
