use std::sync::{Arc, Mutex};

use chrono::Utc;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use postcraft_post_model::post::Post;
use postcraft_render_engine::background::{png_data_url, BackgroundLoader};
use postcraft_render_engine::error::{BackgroundError, RasterError};
use postcraft_render_engine::scene::{Document, Node, NodeKind};
use postcraft_render_engine::style::{Display, Style};
use postcraft_render_engine::{
    build_post_card, CardState, Capture, DefaultBackgroundLoader, ExportError, ExportOptions,
    Exporter, ImageRasterizer, Rasterizer,
};

/// What the rasterizer saw at capture time.
#[derive(Debug, Clone, Default)]
struct Observed {
    heading_font_size: Option<f32>,
    container_padding: Option<f32>,
    visible_kinds: Vec<&'static str>,
}

/// Records the filtered scene and returns a blank bitmap of the requested
/// size, or a fixed error.
#[derive(Default)]
struct RecordingRasterizer {
    seen: Mutex<Vec<Observed>>,
    fail: bool,
    wrong_size: bool,
}

fn kind_name(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Card { .. } => "card",
        NodeKind::TextContainer => "container",
        NodeKind::Heading { .. } => "heading",
        NodeKind::TextArea { .. } => "textarea",
        NodeKind::Badge(_) => "badge",
        NodeKind::Button { .. } => "button",
        NodeKind::Group => "group",
    }
}

impl RecordingRasterizer {
    fn visit(&self, capture: &Capture<'_>, id: postcraft_render_engine::NodeId, out: &mut Observed) {
        let Some(node) = capture.document.node(id) else {
            return;
        };
        if !(capture.filter)(node) {
            return;
        }
        out.visible_kinds.push(kind_name(&node.kind));
        match node.kind {
            NodeKind::Heading { .. } => {
                out.heading_font_size = node.style.as_ref().and_then(|s| s.font_size);
            }
            NodeKind::TextContainer => {
                out.container_padding = node.style.as_ref().and_then(|s| s.padding);
            }
            _ => {}
        }
        for child in node.children() {
            self.visit(capture, *child, out);
        }
    }

    fn last(&self) -> Observed {
        self.seen.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl Rasterizer for RecordingRasterizer {
    fn rasterize(&self, capture: &Capture<'_>) -> Result<RgbaImage, RasterError> {
        let mut observed = Observed::default();
        self.visit(capture, capture.root, &mut observed);
        self.seen.lock().unwrap().push(observed);

        if self.fail {
            return Err(RasterError::new("canvas tainted"));
        }
        let (w, h) = capture.options.physical_size()?;
        if self.wrong_size {
            return Ok(RgbaImage::new(w / 2, h / 2));
        }
        Ok(RgbaImage::new(w, h))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

struct NoBackgrounds;

#[async_trait::async_trait]
impl BackgroundLoader for NoBackgrounds {
    async fn load(&self, _reference: &str) -> Result<DynamicImage, BackgroundError> {
        Err(BackgroundError::InvalidDataUrl)
    }
}

fn exporter(rasterizer: Arc<dyn Rasterizer>) -> Exporter {
    Exporter::new(rasterizer, Arc::new(NoBackgrounds), ExportOptions::default())
}

fn post(headline: &str) -> Post {
    let mut post = Post::new(headline, "caption", vec!["tag".into()], "bg.png", Utc::now());
    post.favorited = true;
    post
}

fn mounted(headline: &str, state: &CardState) -> (Document, Post) {
    let mut doc = Document::new();
    let post = post(headline);
    build_post_card(&mut doc, &post, state);
    (doc, post)
}

#[tokio::test]
async fn short_headline_exports_at_120px_without_chrome() {
    let raster = Arc::new(RecordingRasterizer::default());
    let (mut doc, post) = mounted(&"a".repeat(25), &CardState::default());

    let image = exporter(raster.clone())
        .render_to_image(&mut doc, &post.id)
        .await
        .unwrap();

    assert_eq!(image.font_size, 120);
    assert_eq!((image.width, image.height), (2160, 2160));
    assert!(image.png.starts_with(&[0x89, b'P', b'N', b'G']));
    assert!(image.warnings.is_empty());

    let seen = raster.last();
    assert_eq!(seen.heading_font_size, Some(120.0));
    assert_eq!(seen.container_padding, Some(80.0));
    assert!(!seen.visible_kinds.contains(&"badge"));
    assert!(!seen.visible_kinds.contains(&"button"));
    assert!(!seen.visible_kinds.contains(&"group"));
}

#[tokio::test]
async fn long_headline_exports_at_70px() {
    let raster = Arc::new(RecordingRasterizer::default());
    let (mut doc, post) = mounted(&"b".repeat(90), &CardState::default());

    let image = exporter(raster.clone())
        .render_to_image(&mut doc, &post.id)
        .await
        .unwrap();

    assert_eq!(image.font_size, 70);
    assert_eq!(raster.last().heading_font_size, Some(70.0));
}

#[tokio::test]
async fn card_is_restored_after_export() {
    let (mut doc, post) = mounted("Breathe", &CardState::default());
    let before = doc.clone();

    exporter(Arc::new(RecordingRasterizer::default()))
        .render_to_image(&mut doc, &post.id)
        .await
        .unwrap();

    let root = doc.element_by_id(&post.element_id()).unwrap();
    for id in std::iter::once(root).chain(doc.descendants(root)) {
        assert_eq!(doc.node(id), before.node(id));
    }
}

#[tokio::test]
async fn card_is_restored_after_failed_capture() {
    let raster = Arc::new(RecordingRasterizer {
        fail: true,
        ..Default::default()
    });
    let (mut doc, post) = mounted("Breathe", &CardState::default());
    let before = doc.clone();

    let err = exporter(raster)
        .render_to_image(&mut doc, &post.id)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::RasterizationFailed { ref message } if message.contains("tainted")));
    let root = doc.element_by_id(&post.element_id()).unwrap();
    for id in std::iter::once(root).chain(doc.descendants(root)) {
        assert_eq!(doc.node(id), before.node(id));
    }
}

#[tokio::test]
async fn editing_card_is_restored_after_failed_capture() {
    let raster = Arc::new(RecordingRasterizer {
        fail: true,
        ..Default::default()
    });
    let (mut doc, post) = mounted("Breathe", &CardState::editing("Breathe deeply"));
    let root = doc.element_by_id(&post.element_id()).unwrap();
    let heading = doc
        .find_descendant(root, |n| matches!(n.kind, NodeKind::Heading { .. }))
        .unwrap();
    let hidden = doc.node(heading).unwrap().style.clone();
    assert_eq!(hidden.as_ref().and_then(|s| s.display), Some(Display::None));

    let err = exporter(raster.clone())
        .render_to_image(&mut doc, &post.id)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::RasterizationFailed { .. }));
    // The committed headline was visible at capture time.
    assert!(raster.last().visible_kinds.contains(&"heading"));
    assert_eq!(doc.node(heading).unwrap().style, hidden);
}

#[tokio::test]
async fn oversized_pixel_ratio_fails_before_rasterizing() {
    let raster = Arc::new(RecordingRasterizer::default());
    let (mut doc, post) = mounted("Breathe", &CardState::default());
    let before = doc.clone();
    let exporter = Exporter::new(
        raster.clone(),
        Arc::new(NoBackgrounds),
        ExportOptions {
            pixel_ratio: u32::MAX,
            ..ExportOptions::default()
        },
    );

    let err = exporter.render_to_image(&mut doc, &post.id).await.unwrap_err();

    assert!(matches!(err, ExportError::RasterizationFailed { ref message } if message.contains("pixel ratio")));
    assert!(raster.seen.lock().unwrap().is_empty());
    let root = doc.element_by_id(&post.element_id()).unwrap();
    for id in std::iter::once(root).chain(doc.descendants(root)) {
        assert_eq!(doc.node(id), before.node(id));
    }
}

#[tokio::test]
async fn wrong_bitmap_size_is_a_rasterization_failure() {
    let raster = Arc::new(RecordingRasterizer {
        wrong_size: true,
        ..Default::default()
    });
    let (mut doc, post) = mounted("Breathe", &CardState::default());

    let err = exporter(raster)
        .render_to_image(&mut doc, &post.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::RasterizationFailed { .. }));
}

#[tokio::test]
async fn unknown_post_is_element_not_found() {
    let raster = Arc::new(RecordingRasterizer::default());
    let (mut doc, _) = mounted("Breathe", &CardState::default());

    let err = exporter(raster.clone())
        .render_to_image(&mut doc, "missing")
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::ElementNotFound { ref element_id } if element_id == "post-missing"));
    assert!(raster.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_post_leaves_document_unchanged() {
    let (mut doc, post) = mounted("Breathe", &CardState::editing("Draft"));
    let before = doc.clone();

    let err = exporter(Arc::new(RecordingRasterizer::default()))
        .render_to_image(&mut doc, "missing")
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::ElementNotFound { .. }));
    assert_eq!(doc.len(), before.len());
    let root = doc.element_by_id(&post.element_id()).unwrap();
    for id in std::iter::once(root).chain(doc.descendants(root)) {
        assert_eq!(doc.node(id), before.node(id));
    }
}

#[tokio::test]
async fn card_without_text_container_is_structure_invalid() {
    let mut doc = Document::new();
    let root = doc.insert(
        None,
        Node::new(NodeKind::Card {
            background: String::new(),
        })
        .with_id("post-bare"),
    );
    let heading = doc.insert(
        Some(root),
        Node::new(NodeKind::Heading {
            text: "Breathe".into(),
        }),
    );
    let raster = Arc::new(RecordingRasterizer::default());

    let err = exporter(raster.clone())
        .render_to_image(&mut doc, "bare")
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::StructureInvalid { missing: "text container", .. }));
    assert_eq!(doc.node(heading).unwrap().style, None);
    assert!(raster.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn card_without_heading_is_structure_invalid() {
    let mut doc = Document::new();
    let root = doc.insert(
        None,
        Node::new(NodeKind::Card {
            background: String::new(),
        })
        .with_id("post-bare"),
    );
    let container = doc.insert(
        Some(root),
        Node::new(NodeKind::TextContainer).with_class("text-container"),
    );
    let untouched = doc.node(container).cloned();

    let err = exporter(Arc::new(RecordingRasterizer::default()))
        .render_to_image(&mut doc, "bare")
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::StructureInvalid { missing: "headline", .. }));
    assert_eq!(doc.node(container).cloned(), untouched);
}

#[tokio::test]
async fn mid_edit_export_omits_textarea_and_shows_committed_headline() {
    let raster = Arc::new(RecordingRasterizer::default());
    let (mut doc, post) = mounted("Breathe", &CardState::editing("Breathe deeply"));

    let image = exporter(raster.clone())
        .render_to_image(&mut doc, &post.id)
        .await
        .unwrap();

    let seen = raster.last();
    assert!(!seen.visible_kinds.contains(&"textarea"));
    assert!(seen.visible_kinds.contains(&"heading"));
    // Sized from the committed text, not the draft.
    assert_eq!(image.font_size, 120);
}

#[tokio::test]
async fn node_removed_mid_export_is_reported_as_warning() {
    let exporter = exporter(Arc::new(RecordingRasterizer::default()));
    let (mut doc, post) = mounted("Breathe", &CardState::default());

    let mut session = exporter.prepare(&mut doc, &post.id).unwrap();
    let root = session.root();
    let heading = session
        .document()
        .find_descendant(root, |n| matches!(n.kind, NodeKind::Heading { .. }))
        .unwrap();
    session.document_mut().remove(heading);

    let image = exporter.complete(session).await.unwrap();
    assert_eq!(image.warnings.len(), 1);
    assert!(matches!(
        image.warnings[0],
        ExportError::StyleRestoreSkipped { node } if node == heading
    ));

    let container = doc
        .find_descendant(root, |n| matches!(n.kind, NodeKind::TextContainer))
        .unwrap();
    assert_eq!(doc.node(container).unwrap().style, None);
}

#[tokio::test]
async fn software_rasterizer_paints_background_without_chrome() {
    let bg = RgbaImage::from_pixel(200, 200, Rgba([200, 40, 40, 255]));
    let mut png = std::io::Cursor::new(Vec::new());
    bg.write_to(&mut png, ImageFormat::Png).unwrap();
    let data_url = png_data_url(&png.into_inner());

    let mut doc = Document::new();
    let mut post = Post::new("", "caption", vec![], data_url, Utc::now());
    post.favorited = true;
    post.approved = true;
    build_post_card(&mut doc, &post, &CardState::default());

    let exporter = Exporter::new(
        Arc::new(ImageRasterizer::new()),
        Arc::new(DefaultBackgroundLoader::new().unwrap()),
        ExportOptions {
            canvas_size: 100,
            ..ExportOptions::default()
        },
    );
    let image = exporter.render_to_image(&mut doc, &post.id).await.unwrap();
    let decoded = image::load_from_memory(&image.png).unwrap().to_rgba8();

    assert_eq!(decoded.dimensions(), (200, 200));
    // Top-right corner is where the badges sit on the live card.
    assert_eq!(decoded.get_pixel(150, 64), &Rgba([200, 40, 40, 255]));
    assert_eq!(decoded.get_pixel(32, 32), &Rgba([200, 40, 40, 255]));
}

#[tokio::test]
async fn download_writes_png_to_nested_destination() {
    let dir = tempfile::tempdir().unwrap();
    let (mut doc, post) = mounted("Breathe", &CardState::default());
    let dest = dir.path().join("exports").join(post.export_filename(1_700_000_000_000));

    let image = exporter(Arc::new(RecordingRasterizer::default()))
        .download_image(&mut doc, &post.id, &dest)
        .await
        .unwrap();

    assert!(dest.ends_with("Breathe_1700000000000.png"));
    let bytes = std::fs::read(&dest).unwrap();
    assert_eq!(bytes, image.png);
    assert_eq!(image.font_size, 120);
}

#[tokio::test]
async fn style_override_leaves_other_cards_untouched() {
    let mut doc = Document::new();
    let first = post("First");
    let second = post("Second");
    build_post_card(&mut doc, &first, &CardState::default());
    let other_root = build_post_card(&mut doc, &second, &CardState::default());
    let before: Vec<_> = doc.descendants(other_root);

    let exporter = exporter(Arc::new(RecordingRasterizer::default()));
    let session = exporter.prepare(&mut doc, &first.id).unwrap();
    for id in &before {
        let style = session.document().node(*id).unwrap().style.clone();
        assert_ne!(style.as_ref().and_then(|s| s.font_size), Some(120.0));
        assert_ne!(style, Some(Style::export_container(1080.0, 80.0)));
    }
    exporter.complete(session).await.unwrap();
}
