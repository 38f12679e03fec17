//! Postcraft Render Engine
//!
//! Turns a post card into a square PNG suitable for publishing.
//!
//! # Pipeline
//!
//! ```text
//! Post ── card::build_post_card ──► Document (live card)
//!                                       │
//!                   Exporter::prepare   │  StyleGuard applies export styles
//!                                       ▼
//!            BackgroundLoader ──► Rasterizer (filter::include_in_export)
//!                                       │
//!                                       ▼
//!                                  PNG encode ──► StyleGuard restores
//! ```
//!
//! The export font size comes from [`sizing::compute_export_font_size`] and
//! is independent of the size bucket the card uses while editing.

pub mod background;
pub mod card;
pub mod error;
pub mod export;
pub mod filter;
pub mod layout;
pub mod raster;
pub mod scene;
pub mod sizing;
pub mod style;

pub use background::{BackgroundLoader, DefaultBackgroundLoader};
pub use card::{build_post_card, mount_posts, remount_post_card, CardState};
pub use error::{BackgroundError, ExportError, RasterError};
pub use export::*;
pub use raster::{Capture, CaptureOptions, ImageRasterizer, Rasterizer};
pub use scene::{Document, Node, NodeId, NodeKind};
pub use sizing::{compute_export_font_size, EditingFontSize};
