//! Post card builder.
//!
//! Builds the visual subtree for one post: background root, centered text
//! container, headline, and the editor chrome layered on top.

use postcraft_post_model::post::Post;

use crate::filter::{EDIT_ELEMENT_CLASS, EXPORT_EXCLUDE_CLASS, UI_OVERLAY_CLASS};
use crate::scene::{BadgeKind, Document, Node, NodeId, NodeKind};
use crate::sizing::{EditingFontSize, DEFAULT_EDITING_WIDTH};
use crate::style::Style;

/// Class marking the wrapper the exporter restyles.
pub const TEXT_CONTAINER_CLASS: &str = "text-container";

/// Class marking the status badge group.
pub const STATUS_GROUP_CLASS: &str = "status-indicators";

/// Class marking the edit toggle.
pub const EDIT_TOGGLE_CLASS: &str = "edit-toggle";

/// Per-card editor state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardState {
    pub editing: bool,
    /// Uncommitted headline text in the editor.
    pub draft_headline: Option<String>,
}

impl CardState {
    pub fn editing(draft: impl Into<String>) -> Self {
        Self {
            editing: true,
            draft_headline: Some(draft.into()),
        }
    }
}

/// Build the card for `post` as a new root in `doc`.
///
/// While editing, the committed headline stays in the tree but hidden, and
/// the editor shows the draft. The size class follows whichever text is on
/// screen.
pub fn build_post_card(doc: &mut Document, post: &Post, state: &CardState) -> NodeId {
    let draft = state
        .draft_headline
        .as_deref()
        .filter(|_| state.editing)
        .unwrap_or(&post.headline);
    let size = EditingFontSize::for_text(draft, DEFAULT_EDITING_WIDTH);

    let root = doc.insert(
        None,
        Node::new(NodeKind::Card {
            background: post.background.clone(),
        })
        .with_id(post.element_id())
        .with_class("post-visual relative w-full h-80 bg-cover bg-center bg-no-repeat flex items-center justify-center overflow-hidden"),
    );

    let container = doc.insert(
        Some(root),
        Node::new(NodeKind::TextContainer).with_class(format!(
            "{TEXT_CONTAINER_CLASS} absolute inset-0 flex items-center justify-center p-8"
        )),
    );

    let heading_style = if state.editing {
        Style::headline_outline().hidden()
    } else {
        Style::headline_outline()
    };
    doc.insert(
        Some(container),
        Node::new(NodeKind::Heading {
            text: post.headline.clone(),
        })
        .with_class(format!(
            "{} font-bold text-white text-center leading-tight break-words max-w-lg px-4",
            size.class_name()
        ))
        .with_style(heading_style),
    );

    if state.editing {
        doc.insert(
            Some(container),
            Node::new(NodeKind::TextArea {
                text: draft.to_string(),
            })
            .with_class(format!(
                "w-full max-w-lg text-center text-white {} font-bold bg-transparent border-2 border-white border-dashed rounded-lg p-4 resize-none {EDIT_ELEMENT_CLASS} leading-tight",
                size.class_name()
            ))
            .with_style(Style::headline_outline()),
        );
    }

    let badges = doc.insert(
        Some(root),
        Node::new(NodeKind::Group).with_class(format!(
            "{STATUS_GROUP_CLASS} absolute top-4 right-4 flex space-x-2 {UI_OVERLAY_CLASS} {EXPORT_EXCLUDE_CLASS}"
        )),
    );
    let flags = [
        (post.favorited, BadgeKind::Favorited, "bg-yellow-500"),
        (post.approved, BadgeKind::Approved, "bg-green-500"),
        (post.scheduled_time.is_some(), BadgeKind::Scheduled, "bg-blue-500"),
    ];
    for (_, kind, color) in flags.into_iter().filter(|(on, _, _)| *on) {
        doc.insert(
            Some(badges),
            Node::new(NodeKind::Badge(kind))
                .with_class(format!("w-8 h-8 {color} rounded-full flex items-center justify-center shadow-lg")),
        );
    }

    let toggle_color = if state.editing {
        "bg-pink-500 text-white"
    } else {
        "bg-white text-gray-600"
    };
    doc.insert(
        Some(root),
        Node::new(NodeKind::Button {
            label: String::new(),
        })
        .with_class(format!(
            "{EDIT_TOGGLE_CLASS} absolute top-4 left-4 w-8 h-8 rounded-full {toggle_color} {UI_OVERLAY_CLASS} {EXPORT_EXCLUDE_CLASS}"
        )),
    );

    root
}

/// Replace the card for `post` (if mounted) with a freshly built one.
pub fn remount_post_card(doc: &mut Document, post: &Post, state: &CardState) -> NodeId {
    if let Some(existing) = doc.element_by_id(&post.element_id()) {
        doc.remove(existing);
    }
    build_post_card(doc, post, state)
}

/// Mount a card for every post in display state.
pub fn mount_posts<'p>(doc: &mut Document, posts: impl IntoIterator<Item = &'p Post>) -> Vec<NodeId> {
    posts
        .into_iter()
        .map(|post| remount_post_card(doc, post, &CardState::default()))
        .collect()
}
