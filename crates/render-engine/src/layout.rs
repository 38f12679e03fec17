//! Box and text layout for card nodes.
//!
//! Inline [`Style`] properties win; anything unset falls back to the handful
//! of utility classes the card builder uses.

use crate::scene::Node;
use crate::sizing::EditingFontSize;
use crate::style::{Display, Length, Position, Style};

const DEFAULT_FONT_PX: f32 = 16.0;
const DEFAULT_LINE_HEIGHT: f32 = 1.2;
const TIGHT_LINE_HEIGHT: f32 = 1.25;
const SPACING_UNIT: f32 = 4.0;

/// Axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Shrink by `dx` horizontally and `dy` vertically on each side.
    pub fn inset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            w: (self.w - 2.0 * dx).max(0.0),
            h: (self.h - 2.0 * dy).max(0.0),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }
}

/// Horizontal text advance for a font size.
pub trait TextMeasure {
    fn line_width(&self, text: &str, font_px: f32) -> f32;
}

/// Every character advances by `ratio × font size`.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvance(pub f32);

impl TextMeasure for FixedAdvance {
    fn line_width(&self, text: &str, font_px: f32) -> f32 {
        text.chars().count() as f32 * font_px * self.0
    }
}

/// Resolved presentation of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub hidden: bool,
    pub font_px: f32,
    pub line_height: f32,
    pub max_width: Option<f32>,
    /// Horizontal, vertical padding.
    pub padding: (f32, f32),
    pub full_bleed: bool,
    pub width: Option<Length>,
    pub height: Option<Length>,
}

impl ComputedStyle {
    pub fn of(node: &Node) -> Self {
        let from_classes = Self::from_classes(node);
        match &node.style {
            Some(style) => from_classes.overlay(style),
            None => from_classes,
        }
    }

    fn from_classes(node: &Node) -> Self {
        let mut computed = Self {
            hidden: false,
            font_px: DEFAULT_FONT_PX,
            line_height: DEFAULT_LINE_HEIGHT,
            max_width: None,
            padding: (0.0, 0.0),
            full_bleed: false,
            width: None,
            height: None,
        };
        let mut absolute = false;
        let mut inset_zero = false;

        for class in node.classes() {
            if let Some(size) = EditingFontSize::from_class(class) {
                computed.font_px = size.px();
                continue;
            }
            match class {
                "hidden" => computed.hidden = true,
                "leading-tight" => computed.line_height = TIGHT_LINE_HEIGHT,
                "max-w-lg" => computed.max_width = Some(512.0),
                "absolute" => absolute = true,
                "inset-0" => inset_zero = true,
                "w-full" => computed.width = Some(Length::Percent(100.0)),
                _ => {
                    if let Some(n) = spacing(class, "p-") {
                        computed.padding = (n, n);
                    } else if let Some(n) = spacing(class, "px-") {
                        computed.padding.0 = n;
                    } else if let Some(n) = spacing(class, "py-") {
                        computed.padding.1 = n;
                    }
                }
            }
        }

        computed.full_bleed = absolute && inset_zero;
        computed
    }

    fn overlay(mut self, style: &Style) -> Self {
        if let Some(display) = style.display {
            self.hidden = display == Display::None;
        }
        if let Some(px) = style.font_size {
            self.font_px = px;
        }
        if let Some(lh) = style.line_height {
            self.line_height = lh;
        }
        if let Some(mw) = style.max_width {
            self.max_width = Some(mw);
        }
        if let Some(p) = style.padding {
            self.padding = (p, p);
        }
        if style.position.is_some() || style.inset.is_some() {
            self.full_bleed = style.position == Some(Position::Absolute) && style.inset == Some(0.0);
        }
        if style.width.is_some() {
            self.width = style.width;
        }
        if style.height.is_some() {
            self.height = style.height;
        }
        self
    }

    pub fn line_height_px(&self) -> f32 {
        self.font_px * self.line_height
    }
}

fn spacing(class: &str, prefix: &str) -> Option<f32> {
    class
        .strip_prefix(prefix)
        .and_then(|n| n.parse::<f32>().ok())
        .map(|n| n * SPACING_UNIT)
}

/// Border box of a wrapper positioned inside `parent`.
///
/// Full-bleed wrappers ignore explicit sizes and cover the parent.
pub fn wrapper_box(computed: &ComputedStyle, parent: Rect) -> Rect {
    let mut rect = parent;
    if computed.full_bleed {
        return rect;
    }
    if let Some(w) = computed.width {
        rect.w = w.resolve(parent.w);
    }
    if let Some(h) = computed.height {
        rect.h = h.resolve(parent.h);
    }
    rect
}

/// Greedy word wrap. Words wider than `max_width` are broken between
/// characters.
pub fn wrap_text(text: &str, font_px: f32, max_width: f32, measure: &dyn TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure.line_width(&candidate, font_px) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if measure.line_width(word, font_px) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    let mut next = current.clone();
                    next.push(c);
                    if !current.is_empty() && measure.line_width(&next, font_px) > max_width {
                        lines.push(std::mem::replace(&mut current, c.to_string()));
                    } else {
                        current = next;
                    }
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// One positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    /// Left edge of the line's ink box.
    pub x: f32,
    /// Top of the line box.
    pub y: f32,
    pub width: f32,
}

/// Lines of a text node centered in `content`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<PlacedLine>,
    pub font_px: f32,
    pub line_height_px: f32,
}

/// Wrap `text` to the node's width and center the block in `content`,
/// horizontally per line and vertically as a whole.
pub fn layout_text_block(
    text: &str,
    computed: &ComputedStyle,
    content: Rect,
    measure: &dyn TextMeasure,
) -> TextBlock {
    let own = content.inset(computed.padding.0, 0.0);
    let mut width = computed.width.map(|w| w.resolve(own.w)).unwrap_or(own.w);
    if let Some(max) = computed.max_width {
        width = width.min(max);
    }

    let font_px = computed.font_px;
    let line_height_px = computed.line_height_px();
    let lines = wrap_text(text, font_px, width, measure);

    let block_height = lines.len() as f32 * line_height_px;
    let top = content.y + (content.h - block_height) / 2.0;
    let half_leading = (line_height_px - font_px) / 2.0;

    let lines = lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let line_width = measure.line_width(&line, font_px);
            PlacedLine {
                x: content.center_x() - line_width / 2.0,
                y: top + i as f32 * line_height_px + half_leading,
                width: line_width,
                text: line,
            }
        })
        .collect();

    TextBlock {
        lines,
        font_px,
        line_height_px,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;

    const MONO: FixedAdvance = FixedAdvance(0.5);

    fn heading(class: &str) -> Node {
        Node::new(NodeKind::Heading {
            text: String::new(),
        })
        .with_class(class)
    }

    #[test]
    fn test_classes_resolve() {
        let computed = ComputedStyle::of(&heading("text-5xl leading-tight max-w-lg px-4"));
        assert_eq!(computed.font_px, 48.0);
        assert_eq!(computed.line_height, 1.25);
        assert_eq!(computed.max_width, Some(512.0));
        assert_eq!(computed.padding, (16.0, 0.0));
    }

    #[test]
    fn test_inline_style_wins_over_classes() {
        let node = heading("text-5xl max-w-lg px-4").with_style(Style::export_text(120.0, 920.0));
        let computed = ComputedStyle::of(&node);
        assert_eq!(computed.font_px, 120.0);
        assert_eq!(computed.max_width, Some(920.0));
        assert_eq!(computed.padding, (0.0, 0.0));
        assert!(!computed.hidden);
    }

    #[test]
    fn test_display_none_hides() {
        let node = heading("text-xl").with_style(Style::default().hidden());
        assert!(ComputedStyle::of(&node).hidden);
    }

    #[test]
    fn test_export_container_box() {
        let node = Node::new(NodeKind::TextContainer)
            .with_class("absolute inset-0 p-8")
            .with_style(Style::export_container(1080.0, 80.0));
        let computed = ComputedStyle::of(&node);
        assert!(computed.full_bleed);
        let outer = wrapper_box(&computed, Rect::new(0.0, 0.0, 1080.0, 1080.0));
        assert_eq!(outer, Rect::new(0.0, 0.0, 1080.0, 1080.0));
        let content = outer.inset(computed.padding.0, computed.padding.1);
        assert_eq!(content, Rect::new(80.0, 80.0, 920.0, 920.0));
    }

    #[test]
    fn test_wrap_respects_width() {
        // 10 px per char at 20 px font.
        let lines = wrap_text("aaa bbb ccc", 20.0, 75.0, &MONO);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let lines = wrap_text("abcdefghij", 20.0, 40.0, &MONO);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        let lines = wrap_text("one\ntwo", 20.0, 1000.0, &MONO);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_block_is_centered() {
        let node = heading("").with_style(Style::export_text(100.0, 920.0));
        let computed = ComputedStyle::of(&node);
        let content = Rect::new(80.0, 80.0, 920.0, 920.0);
        let block = layout_text_block("Hi", &computed, content, &MONO);

        assert_eq!(block.lines.len(), 1);
        let line = &block.lines[0];
        assert_eq!(line.width, 100.0);
        assert_eq!(line.x, 540.0 - 50.0);
        // 120 px line box centered on 540, glyph box inset by half leading.
        assert_eq!(line.y, 540.0 - 60.0 + 10.0);
    }
}
