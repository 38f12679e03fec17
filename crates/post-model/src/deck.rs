//! In-session post collection.
//!
//! The deck owns every post created during a session. Posts are appended by
//! imports and mutated in place by edits; nothing is ever removed.

use chrono::{DateTime, Utc};
use postcraft_common::clock::Clock;

use crate::background::background_for_index;
use crate::import::PostUpload;
use crate::post::Post;

/// Counters shown in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeckStats {
    pub total: usize,
    pub approved: usize,
    pub favorited: usize,
}

/// Errors from deck edits.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("Post not found: {id}")]
    PostNotFound { id: String },
}

/// Ordered collection of posts for one session.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    posts: Vec<Post>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one post per upload and return the new posts' ids.
    ///
    /// Backgrounds are assigned by absolute position in the deck so a second
    /// import keeps cycling where the first one stopped.
    pub fn import(
        &mut self,
        uploads: Vec<PostUpload>,
        uploaded_backgrounds: &[String],
        clock: &dyn Clock,
    ) -> Vec<String> {
        let offset = self.posts.len();
        let created_at = clock.now();
        let mut ids = Vec::with_capacity(uploads.len());

        for (i, upload) in uploads.into_iter().enumerate() {
            let post = Post::new(
                upload.headline,
                upload.caption,
                upload.hashtags,
                background_for_index(uploaded_backgrounds, offset + i),
                created_at,
            );
            ids.push(post.id.clone());
            self.posts.push(post);
        }

        tracing::info!(imported = ids.len(), total = self.posts.len(), "Imported posts");
        ids
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Post, DeckError> {
        self.posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DeckError::PostNotFound { id: id.to_string() })
    }

    /// Replace the stored post that has the same id.
    pub fn update(&mut self, post: Post) -> Result<(), DeckError> {
        let slot = self.get_mut(&post.id)?;
        *slot = post;
        Ok(())
    }

    /// Flip the favorite flag and return its new value.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, DeckError> {
        let post = self.get_mut(id)?;
        post.favorited = !post.favorited;
        Ok(post.favorited)
    }

    /// Flip the approved flag and return its new value.
    pub fn toggle_approved(&mut self, id: &str) -> Result<bool, DeckError> {
        let post = self.get_mut(id)?;
        post.approved = !post.approved;
        Ok(post.approved)
    }

    pub fn set_scheduled(&mut self, id: &str, at: Option<DateTime<Utc>>) -> Result<(), DeckError> {
        self.get_mut(id)?.scheduled_time = at;
        Ok(())
    }

    /// A published post counts as approved and is no longer scheduled.
    pub fn mark_published(&mut self, id: &str) -> Result<(), DeckError> {
        let post = self.get_mut(id)?;
        post.approved = true;
        post.scheduled_time = None;
        Ok(())
    }

    pub fn stats(&self) -> DeckStats {
        DeckStats {
            total: self.posts.len(),
            approved: self.posts.iter().filter(|p| p.approved).count(),
            favorited: self.posts.iter().filter(|p| p.favorited).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::DEFAULT_BACKGROUNDS;
    use crate::import::parse_import;
    use postcraft_common::clock::FixedClock;

    fn deck_with(json: &str) -> (Deck, Vec<String>) {
        let mut deck = Deck::new();
        let ids = deck.import(
            parse_import(json).unwrap(),
            &[],
            &FixedClock::from_millis(1_000),
        );
        (deck, ids)
    }

    #[test]
    fn test_import_creates_one_post_per_record() {
        let (deck, ids) =
            deck_with(r#"[{"headline":"Breathe","caption":"Just breathe.","hashtags":["calm"]}]"#);
        assert_eq!(deck.len(), 1);
        let post = deck.get(&ids[0]).unwrap();
        assert_eq!(post.hashtags, vec!["calm".to_string()]);
        assert_eq!(post.created_at.timestamp_millis(), 1_000);
    }

    #[test]
    fn test_failed_import_creates_nothing() {
        let deck = Deck::new();
        assert!(parse_import(r#"[{"headline":"Missing caption"}]"#).is_err());
        assert!(deck.is_empty());
    }

    #[test]
    fn test_second_import_continues_background_cycle() {
        let (mut deck, _) = deck_with(r#"[{"headline":"a","caption":"b"},{"headline":"c","caption":"d"}]"#);
        let ids = deck.import(
            parse_import(r#"[{"headline":"e","caption":"f"}]"#).unwrap(),
            &[],
            &FixedClock::from_millis(2_000),
        );
        assert_eq!(deck.get(&ids[0]).unwrap().background, DEFAULT_BACKGROUNDS[2]);
    }

    #[test]
    fn test_toggles_and_stats() {
        let (mut deck, ids) =
            deck_with(r#"[{"headline":"a","caption":"b"},{"headline":"c","caption":"d"}]"#);
        assert!(deck.toggle_favorite(&ids[0]).unwrap());
        assert!(deck.toggle_approved(&ids[1]).unwrap());
        assert!(!deck.toggle_approved(&ids[1]).unwrap());
        assert_eq!(
            deck.stats(),
            DeckStats {
                total: 2,
                approved: 0,
                favorited: 1
            }
        );
    }

    #[test]
    fn test_mark_published_clears_schedule() {
        let (mut deck, ids) = deck_with(r#"[{"headline":"a","caption":"b"}]"#);
        deck.set_scheduled(&ids[0], Some(Utc::now())).unwrap();
        deck.mark_published(&ids[0]).unwrap();
        let post = deck.get(&ids[0]).unwrap();
        assert!(post.approved);
        assert!(post.scheduled_time.is_none());
    }

    #[test]
    fn test_update_replaces_by_id() {
        let (mut deck, ids) = deck_with(r#"[{"headline":"a","caption":"b"}]"#);
        let mut edited = deck.get(&ids[0]).unwrap().clone();
        edited.headline = "Edited".to_string();
        deck.update(edited).unwrap();
        assert_eq!(deck.get(&ids[0]).unwrap().headline, "Edited");
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let mut deck = Deck::new();
        assert!(matches!(
            deck.toggle_favorite("nope"),
            Err(DeckError::PostNotFound { .. })
        ));
    }
}
