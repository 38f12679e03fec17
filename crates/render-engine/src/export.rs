//! Post card export.
//!
//! An export restyles the live card for a square canvas, rasterizes it with
//! editor chrome filtered out, encodes a PNG, and puts the card back exactly
//! as it was. Restoration happens on every path, including failures.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, ImageFormat};
use postcraft_common::config::RenderDefaults;
use postcraft_post_model::post::card_element_id;

use crate::background::BackgroundLoader;
use crate::card::TEXT_CONTAINER_CLASS;
use crate::error::ExportError;
use crate::filter::include_in_export;
use crate::raster::{Capture, CaptureOptions, Rasterizer};
use crate::scene::{Document, NodeId, NodeKind};
use crate::sizing::compute_export_font_size;
use crate::style::{Style, StyleGuard, EXPORT_MAX_TEXT_WIDTH, EXPORT_PADDING};

/// Export geometry and timing.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Logical edge length of the square canvas. `padding` and
    /// `max_text_width` are in the same units and are not rescaled.
    pub canvas_size: u32,
    pub pixel_ratio: u32,
    /// Wait between applying export styles and capturing.
    pub settle_delay: Duration,
    pub padding: f32,
    pub max_text_width: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            canvas_size: 1080,
            pixel_ratio: 2,
            settle_delay: Duration::ZERO,
            padding: EXPORT_PADDING,
            max_text_width: EXPORT_MAX_TEXT_WIDTH,
        }
    }
}

impl From<&RenderDefaults> for ExportOptions {
    fn from(defaults: &RenderDefaults) -> Self {
        Self {
            pixel_ratio: defaults.pixel_ratio,
            settle_delay: Duration::from_millis(defaults.settle_delay_ms),
            ..Self::default()
        }
    }
}

impl ExportOptions {
    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions::square(self.canvas_size, self.pixel_ratio)
    }
}

/// A finished export.
#[derive(Debug)]
pub struct RenderedImage {
    /// PNG-encoded bytes.
    pub png: Vec<u8>,
    /// Physical width.
    pub width: u32,
    /// Physical height.
    pub height: u32,
    /// Export font size that was applied to the headline.
    pub font_size: u32,
    /// Non-fatal cleanup problems, currently only skipped style restores.
    pub warnings: Vec<ExportError>,
}

/// An export with its style overrides applied and not yet captured.
///
/// The live document stays reachable through [`ExportSession::document_mut`]
/// so edits that land mid-export can be modelled.
pub struct ExportSession<'d> {
    guard: StyleGuard<'d>,
    root: NodeId,
    element_id: String,
    font_size: u32,
    background: String,
}

impl<'d> ExportSession<'d> {
    pub fn document(&self) -> &Document {
        self.guard.document()
    }

    pub fn document_mut(&mut self) -> &mut Document {
        self.guard.document_mut()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }
}

/// Renders post cards to PNG.
#[derive(Clone)]
pub struct Exporter {
    rasterizer: Arc<dyn Rasterizer>,
    backgrounds: Arc<dyn BackgroundLoader>,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        backgrounds: Arc<dyn BackgroundLoader>,
        options: ExportOptions,
    ) -> Self {
        Self {
            rasterizer,
            backgrounds,
            options,
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Render the card for `post_id` to a PNG.
    pub async fn render_to_image(
        &self,
        doc: &mut Document,
        post_id: &str,
    ) -> Result<RenderedImage, ExportError> {
        let session = self.prepare(doc, post_id)?;
        self.complete(session).await
    }

    /// Locate the card and apply the export overrides.
    ///
    /// Nothing is modified when this fails.
    pub fn prepare<'d>(
        &self,
        doc: &'d mut Document,
        post_id: &str,
    ) -> Result<ExportSession<'d>, ExportError> {
        let element_id = card_element_id(post_id);
        let root = doc
            .element_by_id(&element_id)
            .ok_or_else(|| ExportError::ElementNotFound {
                element_id: element_id.clone(),
            })?;

        let container = doc
            .find_descendant(root, |n| n.has_class(TEXT_CONTAINER_CLASS))
            .ok_or_else(|| ExportError::StructureInvalid {
                element_id: element_id.clone(),
                missing: "text container",
            })?;
        let heading = doc
            .find_descendant(container, |n| matches!(n.kind, NodeKind::Heading { .. }))
            .ok_or_else(|| ExportError::StructureInvalid {
                element_id: element_id.clone(),
                missing: "headline",
            })?;

        let text_length = doc.text_content(heading).chars().count();
        let font_size = compute_export_font_size(text_length);
        let background = match doc.node(root).map(|n| &n.kind) {
            Some(NodeKind::Card { background }) => background.clone(),
            _ => String::new(),
        };

        tracing::debug!(
            element_id = %element_id,
            text_length,
            font_size,
            "Applying export styles"
        );

        let canvas = self.options.canvas_size as f32;
        let guard = StyleGuard::apply(
            doc,
            vec![
                (
                    container,
                    Style::export_container(canvas, self.options.padding),
                ),
                (
                    heading,
                    Style::export_text(font_size as f32, self.options.max_text_width),
                ),
            ],
        );

        Ok(ExportSession {
            guard,
            root,
            element_id,
            font_size,
            background,
        })
    }

    /// Capture and encode a prepared export, then restore the card.
    pub async fn complete(&self, session: ExportSession<'_>) -> Result<RenderedImage, ExportError> {
        let ExportSession {
            guard,
            root,
            element_id,
            font_size,
            background,
        } = session;

        if !self.options.settle_delay.is_zero() {
            tokio::time::sleep(self.options.settle_delay).await;
        }

        let background = self.load_background(&background).await;
        let encoded = self.capture(guard.document(), root, background.as_ref());

        let warnings = guard.release();
        for warning in &warnings {
            tracing::warn!(%warning, element_id = %element_id, "Export cleanup warning");
        }

        let (png, width, height) = encoded.inspect_err(|e| {
            tracing::error!(error = %e, element_id = %element_id, "Export failed");
        })?;

        tracing::info!(
            element_id = %element_id,
            width,
            height,
            bytes = png.len(),
            rasterizer = self.rasterizer.name(),
            "Export rendered"
        );

        Ok(RenderedImage {
            png,
            width,
            height,
            font_size,
            warnings,
        })
    }

    /// Render and write the PNG to `destination`, creating parent
    /// directories as needed.
    pub async fn download_image(
        &self,
        doc: &mut Document,
        post_id: &str,
        destination: &Path,
    ) -> Result<RenderedImage, ExportError> {
        let image = self.render_to_image(doc, post_id).await?;

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ExportError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(destination, &image.png)
            .await
            .map_err(|source| ExportError::Io {
                path: destination.to_path_buf(),
                source,
            })?;

        tracing::info!(path = %destination.display(), "Image written");
        Ok(image)
    }

    async fn load_background(&self, reference: &str) -> Option<DynamicImage> {
        if reference.trim().is_empty() {
            return None;
        }
        match self.backgrounds.load(reference).await {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    background = %truncate(reference, 80),
                    "Background unavailable, exporting over transparency"
                );
                None
            }
        }
    }

    fn capture(
        &self,
        doc: &Document,
        root: NodeId,
        background: Option<&DynamicImage>,
    ) -> Result<(Vec<u8>, u32, u32), ExportError> {
        let options = self.options.capture_options();
        let expected = options.physical_size()?;
        let capture = Capture {
            document: doc,
            root,
            options,
            filter: &include_in_export,
            background,
        };
        let bitmap = self.rasterizer.rasterize(&capture)?;

        if bitmap.dimensions() != expected {
            return Err(ExportError::RasterizationFailed {
                message: format!(
                    "{} produced {}x{}, expected {}x{}",
                    self.rasterizer.name(),
                    bitmap.width(),
                    bitmap.height(),
                    expected.0,
                    expected.1
                ),
            });
        }

        let mut out = Cursor::new(Vec::new());
        bitmap
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| ExportError::RasterizationFailed {
                message: format!("PNG encoding failed: {e}"),
            })?;
        Ok((out.into_inner(), expected.0, expected.1))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
