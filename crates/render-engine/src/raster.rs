//! Rasterization of a card subtree into RGBA pixels.

use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_text_mut, text_size};

use crate::error::RasterError;
use crate::layout::{layout_text_block, wrapper_box, ComputedStyle, Rect, TextMeasure};
use crate::scene::{BadgeKind, Document, Node, NodeId, NodeKind};
use crate::style::{Color, TextShadow};

const BADGE_SIZE: f32 = 32.0;
const BADGE_GAP: f32 = 8.0;
const OVERLAY_MARGIN: f32 = 16.0;
const TEXTAREA_BORDER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Font files tried by [`ImageRasterizer::from_system_fonts`], in order.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Output geometry of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Logical width.
    pub width: u32,
    /// Logical height.
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub pixel_ratio: u32,
}

impl CaptureOptions {
    pub fn square(size: u32, pixel_ratio: u32) -> Self {
        Self {
            width: size,
            height: size,
            pixel_ratio,
        }
    }

    /// Bitmap dimensions. Zero or overflowing sizes are rejected.
    pub fn physical_size(&self) -> Result<(u32, u32), RasterError> {
        let scale = |logical: u32| {
            logical
                .checked_mul(self.pixel_ratio)
                .filter(|px| *px > 0)
                .ok_or_else(|| {
                    RasterError::new(format!(
                        "Invalid capture size {}x{} at pixel ratio {}",
                        self.width, self.height, self.pixel_ratio
                    ))
                })
        };
        Ok((scale(self.width)?, scale(self.height)?))
    }
}

/// Everything a rasterizer needs for one capture.
pub struct Capture<'a> {
    pub document: &'a Document,
    pub root: NodeId,
    pub options: CaptureOptions,
    /// Subtrees whose root fails this predicate are skipped entirely.
    pub filter: &'a dyn Fn(&Node) -> bool,
    /// Pre-resolved background for the root, if any.
    pub background: Option<&'a DynamicImage>,
}

/// Turns a capture into a bitmap of exactly `options.physical_size()`.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, capture: &Capture<'_>) -> Result<RgbaImage, RasterError>;

    fn name(&self) -> &'static str;
}

/// Software rasterizer built on `image` and `imageproc`.
#[derive(Clone, Default)]
pub struct ImageRasterizer {
    font: Option<FontArc>,
}

impl std::fmt::Debug for ImageRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageRasterizer")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl ImageRasterizer {
    /// Rasterizer without a font. Cards with visible text fail to render.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(font: FontArc) -> Self {
        Self { font: Some(font) }
    }

    pub fn with_font_file(path: &Path) -> Result<Self, RasterError> {
        let bytes = std::fs::read(path)
            .map_err(|e| RasterError::new(format!("Failed to read font {}: {e}", path.display())))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| RasterError::new(format!("Invalid font {}: {e}", path.display())))?;
        Ok(Self::with_font(font))
    }

    /// First loadable bold sans-serif from the usual system locations.
    pub fn from_system_fonts() -> Option<Self> {
        SYSTEM_FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .filter(|p| p.exists())
            .find_map(|p| match Self::with_font_file(&p) {
                Ok(r) => {
                    tracing::debug!(font = %p.display(), "Using system font");
                    Some(r)
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping font candidate");
                    None
                }
            })
    }

    /// Configured font if given, else a system font, else no font.
    pub fn load(font_path: Option<&Path>) -> Result<Self, RasterError> {
        match font_path {
            Some(path) => Self::with_font_file(path),
            None => Ok(Self::from_system_fonts().unwrap_or_else(|| {
                tracing::warn!("No system font found; text will fail to render");
                Self::new()
            })),
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

struct FontMeasure<'f>(&'f FontArc);

impl TextMeasure for FontMeasure<'_> {
    fn line_width(&self, text: &str, font_px: f32) -> f32 {
        text_size(PxScale::from(font_px), self.0, text).0 as f32
    }
}

struct Painter<'a> {
    canvas: RgbaImage,
    capture: &'a Capture<'a>,
    font: Option<&'a FontArc>,
    ratio: f32,
}

impl Painter<'_> {
    fn paint_children(&mut self, id: NodeId, area: Rect) -> Result<(), RasterError> {
        let doc = self.capture.document;
        let Some(node) = doc.node(id) else {
            return Ok(());
        };
        let visible: Vec<NodeId> = node
            .children()
            .iter()
            .copied()
            .filter(|c| doc.node(*c).is_some_and(|n| (self.capture.filter)(n)))
            .collect();
        for child in visible {
            self.paint(child, area)?;
        }
        Ok(())
    }

    fn paint(&mut self, id: NodeId, area: Rect) -> Result<(), RasterError> {
        let doc = self.capture.document;
        let Some(node) = doc.node(id) else {
            return Ok(());
        };
        let computed = ComputedStyle::of(node);
        if computed.hidden {
            return Ok(());
        }

        match &node.kind {
            NodeKind::Card { .. } => self.paint_children(id, area),
            NodeKind::TextContainer => {
                let outer = wrapper_box(&computed, area);
                let content = outer.inset(computed.padding.0, computed.padding.1);
                self.paint_children(id, content)
            }
            NodeKind::Heading { text } => self.paint_text(node, text, &computed, area),
            NodeKind::TextArea { text } => {
                self.paint_textarea_frame(&computed, area);
                self.paint_text(node, text, &computed, area)
            }
            NodeKind::Group => {
                self.paint_badges(id);
                Ok(())
            }
            NodeKind::Button { .. } => {
                let r = BADGE_SIZE / 2.0;
                self.circle(OVERLAY_MARGIN + r, OVERLAY_MARGIN + r, r, Rgba([255, 255, 255, 255]));
                Ok(())
            }
            NodeKind::Badge(kind) => {
                let r = BADGE_SIZE / 2.0;
                self.circle(area.x + r, area.y + r, r, badge_color(*kind));
                Ok(())
            }
        }
    }

    /// Badges sit in a right-aligned row at the card's top-right corner.
    fn paint_badges(&mut self, group: NodeId) {
        let doc = self.capture.document;
        let Some(node) = doc.node(group) else {
            return;
        };
        let badges: Vec<BadgeKind> = node
            .children()
            .iter()
            .filter_map(|c| doc.node(*c))
            .filter(|n| (self.capture.filter)(n))
            .filter_map(|n| match n.kind {
                NodeKind::Badge(kind) => Some(kind),
                _ => None,
            })
            .collect();
        if badges.is_empty() {
            return;
        }

        let count = badges.len() as f32;
        let row = count * BADGE_SIZE + (count - 1.0) * BADGE_GAP;
        let left = self.capture.options.width as f32 - OVERLAY_MARGIN - row;
        let r = BADGE_SIZE / 2.0;
        for (i, kind) in badges.into_iter().enumerate() {
            let cx = left + i as f32 * (BADGE_SIZE + BADGE_GAP) + r;
            self.circle(cx, OVERLAY_MARGIN + r, r, badge_color(kind));
        }
    }

    fn paint_textarea_frame(&mut self, computed: &ComputedStyle, area: Rect) {
        let width = computed
            .max_width
            .map(|m| m.min(area.w))
            .unwrap_or(area.w);
        let x = area.center_x() - width / 2.0;
        let rect = imageproc::rect::Rect::at((x * self.ratio) as i32, (area.y * self.ratio) as i32)
            .of_size(
                ((width * self.ratio) as u32).max(1),
                ((area.h * self.ratio) as u32).max(1),
            );
        draw_hollow_rect_mut(&mut self.canvas, rect, TEXTAREA_BORDER);
    }

    fn paint_text(
        &mut self,
        node: &Node,
        text: &str,
        computed: &ComputedStyle,
        area: Rect,
    ) -> Result<(), RasterError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let font = self
            .font
            .ok_or_else(|| RasterError::new("No font available to draw text"))?;

        let block = layout_text_block(text, computed, area, &FontMeasure(font));
        let scale = PxScale::from(block.font_px * self.ratio);
        let style = node.style.as_ref();
        let fill = style
            .and_then(|s| s.color)
            .unwrap_or(Color::WHITE);
        let shadows: &[TextShadow] = style.map(|s| s.text_shadow.as_slice()).unwrap_or(&[]);

        for line in &block.lines {
            let x = line.x * self.ratio;
            let y = line.y * self.ratio;
            for shadow in shadows {
                draw_text_mut(
                    &mut self.canvas,
                    Rgba(shadow.color.0),
                    (x + shadow.dx * self.ratio).round() as i32,
                    (y + shadow.dy * self.ratio).round() as i32,
                    scale,
                    font,
                    &line.text,
                );
            }
            draw_text_mut(
                &mut self.canvas,
                Rgba(fill.0),
                x.round() as i32,
                y.round() as i32,
                scale,
                font,
                &line.text,
            );
        }
        Ok(())
    }

    fn circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgba<u8>) {
        draw_filled_circle_mut(
            &mut self.canvas,
            ((cx * self.ratio) as i32, (cy * self.ratio) as i32),
            (r * self.ratio) as i32,
            color,
        );
    }
}

fn badge_color(kind: BadgeKind) -> Rgba<u8> {
    match kind {
        BadgeKind::Favorited => Rgba([234, 179, 8, 255]),
        BadgeKind::Approved => Rgba([34, 197, 94, 255]),
        BadgeKind::Scheduled => Rgba([59, 130, 246, 255]),
    }
}

impl Rasterizer for ImageRasterizer {
    fn rasterize(&self, capture: &Capture<'_>) -> Result<RgbaImage, RasterError> {
        let (width, height) = capture.options.physical_size()?;
        if !capture.document.contains(capture.root) {
            return Err(RasterError::new("Capture root is not in the document"));
        }

        let mut canvas = RgbaImage::new(width, height);
        if let Some(bg) = capture.background {
            let filled = if bg.dimensions() == (width, height) {
                bg.to_rgba8()
            } else {
                bg.resize_to_fill(width, height, FilterType::Triangle).to_rgba8()
            };
            imageops::overlay(&mut canvas, &filled, 0, 0);
        }

        let mut painter = Painter {
            canvas,
            capture,
            font: self.font.as_ref(),
            ratio: capture.options.pixel_ratio as f32,
        };
        let area = Rect::new(
            0.0,
            0.0,
            capture.options.width as f32,
            capture.options.height as f32,
        );
        painter.paint(capture.root, area)?;
        Ok(painter.canvas)
    }

    fn name(&self) -> &'static str {
        "image"
    }
}
