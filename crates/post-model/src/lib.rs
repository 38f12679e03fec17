//! Postcraft Post Model
//!
//! Defines the core data contracts for Postcraft:
//! - **Post:** One curated card (headline, caption, hashtags, background, status flags)
//! - **Import:** The JSON batch format that creates posts, with per-record validation
//! - **Media:** Uploaded background records kept in local storage
//! - **Schedule:** Publish/schedule requests and locally tracked scheduled posts
//! - **Deck:** The in-session collection of posts and its editing operations

pub mod background;
pub mod deck;
pub mod import;
pub mod media;
pub mod post;
pub mod schedule;

pub use background::*;
pub use deck::*;
pub use import::*;
pub use media::*;
pub use post::*;
pub use schedule::*;
