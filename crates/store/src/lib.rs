//! Postcraft Store
//!
//! Small string key-value persistence plus the typed records kept in it:
//! - [`MediaLibrary`]: uploaded backgrounds under `uploaded_backgrounds`
//! - [`ScheduleLedger`]: scheduled posts under `scheduled_posts`
//! - [`CredentialStore`]: Instagram token and user id
//!
//! Values are JSON strings, so a store file written by one version stays
//! readable key by key even if another key is corrupt.

pub mod credentials;
pub mod kv;
pub mod media;
pub mod schedule;

pub use credentials::*;
pub use kv::*;
pub use media::*;
pub use schedule::*;
