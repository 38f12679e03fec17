//! Export exclusion predicate.
//!
//! Editor chrome (edit toggle, status badges, the in-place headline editor)
//! is tagged with one of [`EXCLUDED_CLASSES`] and never reaches the raster.
//! An excluded node takes its whole subtree with it.

use crate::scene::Node;

pub const UI_OVERLAY_CLASS: &str = "ui-overlay";
pub const EXPORT_EXCLUDE_CLASS: &str = "export-exclude";
pub const EDIT_ELEMENT_CLASS: &str = "edit-element";

pub const EXCLUDED_CLASSES: [&str; 3] = [UI_OVERLAY_CLASS, EXPORT_EXCLUDE_CLASS, EDIT_ELEMENT_CLASS];

/// Whether `node` belongs in an exported image.
pub fn include_in_export(node: &Node) -> bool {
    !node.classes().any(|c| EXCLUDED_CLASSES.contains(&c))
}

/// Predicate that keeps every node (live capture).
pub fn include_all(_node: &Node) -> bool {
    true
}
