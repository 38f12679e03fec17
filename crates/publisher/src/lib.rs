//! Postcraft Publisher
//!
//! Instagram Graph API client: OAuth code exchange, immediate publishing
//! through a media container, and locally recorded scheduling.

pub mod client;
pub mod error;

pub use client::*;
pub use error::*;
