//! Inline styles and the scoped export override.
//!
//! Export styling is applied by replacing a node's inline style, the same
//! way the live card's own style is set. [`StyleGuard`] records each target's
//! `(class_name, style)` before the override and puts it back when released
//! or dropped, so an export can never leave its styling on the live card.

use std::fmt;

use crate::error::ExportError;
use crate::scene::{Document, NodeId};

/// Padding inside the export canvas, in logical pixels.
pub const EXPORT_PADDING: f32 = 80.0;

/// Widest a headline line may be on the export canvas.
pub const EXPORT_MAX_TEXT_WIDTH: f32 = 920.0;

/// Offset of each outline stroke copy.
pub const OUTLINE_OFFSET: f32 = 2.0;

pub const EXPORT_LINE_HEIGHT: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    None,
    Block,
    Flex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
}

impl Length {
    /// Resolve against the containing block's size.
    pub fn resolve(self, containing: f32) -> f32 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => containing * pct / 100.0,
        }
    }
}

/// Straight RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const WHITE: Color = Color([255, 255, 255, 255]);
}

/// One hard-edged shadow copy of the text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextShadow {
    pub dx: f32,
    pub dy: f32,
    pub color: Color,
}

/// Inline style: every property is optional and unset ones fall back to
/// the node's classes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub position: Option<Position>,
    /// Same offset on all four sides.
    pub inset: Option<f32>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub padding: Option<f32>,
    pub display: Option<Display>,
    /// Center children on both axes.
    pub center_content: Option<bool>,
    pub font_size: Option<f32>,
    /// Multiple of the font size.
    pub line_height: Option<f32>,
    pub text_align: Option<TextAlign>,
    pub max_width: Option<f32>,
    pub font_weight: Option<FontWeight>,
    pub color: Option<Color>,
    pub text_shadow: Vec<TextShadow>,
}

impl Style {
    /// Eight hard copies around the glyphs: a solid stroke of `offset` px.
    pub fn outline(offset: f32, color: Color) -> Vec<TextShadow> {
        [
            (1.0, 1.0),
            (-1.0, -1.0),
            (1.0, -1.0),
            (-1.0, 1.0),
            (0.0, 1.0),
            (1.0, 0.0),
            (0.0, -1.0),
            (-1.0, 0.0),
        ]
        .into_iter()
        .map(|(x, y)| TextShadow {
            dx: x * offset,
            dy: y * offset,
            color,
        })
        .collect()
    }

    /// Live headline style: only the black outline.
    pub fn headline_outline() -> Self {
        Self {
            text_shadow: Self::outline(OUTLINE_OFFSET, Color::BLACK),
            ..Self::default()
        }
    }

    /// Full-bleed, centered container filling a square canvas.
    pub fn export_container(canvas_size: f32, padding: f32) -> Self {
        Self {
            position: Some(Position::Absolute),
            inset: Some(0.0),
            width: Some(Length::Px(canvas_size)),
            height: Some(Length::Px(canvas_size)),
            padding: Some(padding),
            display: Some(Display::Flex),
            center_content: Some(true),
            ..Self::default()
        }
    }

    /// Headline styling for the export canvas.
    pub fn export_text(font_px: f32, max_width: f32) -> Self {
        Self {
            position: Some(Position::Relative),
            width: Some(Length::Percent(100.0)),
            padding: Some(0.0),
            display: Some(Display::Block),
            font_size: Some(font_px),
            line_height: Some(EXPORT_LINE_HEIGHT),
            text_align: Some(TextAlign::Center),
            max_width: Some(max_width),
            font_weight: Some(FontWeight::Bold),
            color: Some(Color::WHITE),
            text_shadow: Self::outline(OUTLINE_OFFSET, Color::BLACK),
            ..Self::default()
        }
    }

    pub fn hidden(mut self) -> Self {
        self.display = Some(Display::None);
        self
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut decls: Vec<String> = Vec::new();
        let length = |l: Length| match l {
            Length::Px(px) => format!("{px}px"),
            Length::Percent(pct) => format!("{pct}%"),
        };
        if let Some(p) = self.position {
            decls.push(format!("position: {}", format!("{p:?}").to_lowercase()));
        }
        if let Some(i) = self.inset {
            decls.push(format!("inset: {i}px"));
        }
        if let Some(w) = self.width {
            decls.push(format!("width: {}", length(w)));
        }
        if let Some(h) = self.height {
            decls.push(format!("height: {}", length(h)));
        }
        if let Some(p) = self.padding {
            decls.push(format!("padding: {p}px"));
        }
        if let Some(d) = self.display {
            decls.push(format!("display: {}", format!("{d:?}").to_lowercase()));
        }
        if self.center_content == Some(true) {
            decls.push("align-items: center; justify-content: center".to_string());
        }
        if let Some(s) = self.font_size {
            decls.push(format!("font-size: {s}px"));
        }
        if let Some(lh) = self.line_height {
            decls.push(format!("line-height: {lh}"));
        }
        if let Some(a) = self.text_align {
            decls.push(format!("text-align: {}", format!("{a:?}").to_lowercase()));
        }
        if let Some(mw) = self.max_width {
            decls.push(format!("max-width: {mw}px"));
        }
        if let Some(w) = self.font_weight {
            decls.push(format!("font-weight: {}", format!("{w:?}").to_lowercase()));
        }
        if let Some(Color([r, g, b, a])) = self.color {
            decls.push(format!("color: rgba({r}, {g}, {b}, {a})"));
        }
        if !self.text_shadow.is_empty() {
            let shadows = self
                .text_shadow
                .iter()
                .map(|s| {
                    let [r, g, b, _] = s.color.0;
                    format!("{}px {}px 0px #{r:02x}{g:02x}{b:02x}", s.dx, s.dy)
                })
                .collect::<Vec<_>>()
                .join(", ");
            decls.push(format!("text-shadow: {shadows}"));
        }
        write!(f, "{}", decls.join("; "))
    }
}

struct Snapshot {
    node: NodeId,
    class_name: String,
    style: Option<Style>,
}

/// Scoped style override over a [`Document`].
///
/// Holds the document mutably for its whole lifetime, so nothing else can
/// observe the overridden state except through the guard itself.
pub struct StyleGuard<'a> {
    doc: &'a mut Document,
    snapshots: Vec<Snapshot>,
    released: bool,
}

impl<'a> StyleGuard<'a> {
    /// Snapshot every target, then replace each target's inline style.
    /// Targets that are not in the document are ignored.
    pub fn apply(doc: &'a mut Document, overrides: Vec<(NodeId, Style)>) -> Self {
        let snapshots = overrides
            .iter()
            .filter_map(|(id, _)| {
                doc.node(*id).map(|n| Snapshot {
                    node: *id,
                    class_name: n.class_name.clone(),
                    style: n.style.clone(),
                })
            })
            .collect();

        for (id, style) in overrides {
            if let Some(node) = doc.node_mut(id) {
                node.style = Some(style);
            }
        }

        Self {
            doc,
            snapshots,
            released: false,
        }
    }

    pub fn document(&self) -> &Document {
        &*self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut *self.doc
    }

    /// Restore every snapshot now. Nodes removed in the meantime are
    /// skipped and reported.
    pub fn release(mut self) -> Vec<ExportError> {
        let warnings = self.restore();
        self.released = true;
        warnings
    }

    fn restore(&mut self) -> Vec<ExportError> {
        let mut warnings = Vec::new();
        for snap in self.snapshots.drain(..) {
            match self.doc.node_mut(snap.node) {
                Some(node) => {
                    node.class_name = snap.class_name;
                    node.style = snap.style;
                }
                None => warnings.push(ExportError::StyleRestoreSkipped { node: snap.node }),
            }
        }
        warnings
    }
}

impl Drop for StyleGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        for warning in self.restore() {
            tracing::warn!(%warning, "Style restore skipped during unwind");
        }
    }
}
