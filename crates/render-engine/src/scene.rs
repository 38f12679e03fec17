//! Scene tree for post cards.
//!
//! A [`Document`] is an arena of styled nodes, standing in for the live view
//! that cards are displayed in. Nodes carry a space-separated class list and
//! an optional inline [`Style`], which is exactly the state the exporter
//! snapshots and restores.

use crate::style::Style;

/// Handle to a node in a [`Document`].
///
/// Handles stay valid after the node is removed; lookups then return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Status badge shown over a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeKind {
    Favorited,
    Approved,
    Scheduled,
}

/// What a node represents.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Card visual root with its background reference.
    Card { background: String },
    /// Full-bleed wrapper that centers the headline.
    TextContainer,
    /// Committed headline text.
    Heading { text: String },
    /// In-place headline editor.
    TextArea { text: String },
    Badge(BadgeKind),
    Button { label: String },
    Group,
}

/// A styled element.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub element_id: Option<String>,
    pub class_name: String,
    pub style: Option<Style>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            element_id: None,
            class_name: String::new(),
            style: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, element_id: impl Into<String>) -> Self {
        self.element_id = Some(element_id.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_name.split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Own text of heading and text-area nodes.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Heading { text } | NodeKind::TextArea { text } => Some(text),
            NodeKind::Button { label } => Some(label),
            _ => None,
        }
    }
}

/// Arena of nodes forming one or more trees.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Option<Node>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `node` under `parent`, or as a new root when `parent` is `None`
    /// or no longer present.
    pub fn insert(&mut self, parent: Option<NodeId>, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = parent.filter(|p| self.contains(*p));
        node.parent = parent;
        node.children.clear();
        self.nodes.push(Some(node));
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            p.children.push(id);
        }
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Live nodes in the document.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First live node carrying `element_id`.
    pub fn element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.nodes.iter().enumerate().find_map(|(i, slot)| {
            slot.as_ref()
                .filter(|n| n.element_id.as_deref() == Some(element_id))
                .map(|_| NodeId(i))
        })
    }

    /// Descendants of `root` in document order, excluding `root` itself.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.node(root) {
            Some(n) => n.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// First descendant of `root` (document order) matching `predicate`.
    pub fn find_descendant(
        &self,
        root: NodeId,
        predicate: impl Fn(&Node) -> bool,
    ) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.node(*id).is_some_and(&predicate))
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        std::iter::once(id)
            .chain(self.descendants(id))
            .filter_map(|n| self.node(n).and_then(Node::text))
            .collect()
    }

    /// Remove `id` and its whole subtree. Returns the number of nodes removed.
    pub fn remove(&mut self, id: NodeId) -> usize {
        let Some(parent) = self.node(id).map(|n| n.parent) else {
            return 0;
        };
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            p.children.retain(|c| *c != id);
        }

        let mut doomed = self.descendants(id);
        doomed.push(id);
        for n in &doomed {
            self.nodes[n.0] = None;
        }
        doomed.len()
    }
}
