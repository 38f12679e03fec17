//! Shared state for CLI commands.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use postcraft_common::clock::{system_clock, SharedClock};
use postcraft_common::config::AppConfig;
use postcraft_post_model::deck::Deck;
use postcraft_post_model::import::load_import_file;
use postcraft_post_model::post::Post;
use postcraft_publisher::InstagramClient;
use postcraft_render_engine::{
    build_post_card, CardState, DefaultBackgroundLoader, Document, ExportOptions, Exporter,
    ImageRasterizer, RenderedImage,
};
use postcraft_store::{FileStore, MediaLibrary, SharedStore};

pub struct Context {
    pub config: AppConfig,
    pub store: SharedStore,
    pub clock: SharedClock,
}

impl Context {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let path = config.storage_path();
        let store = FileStore::open(&path)
            .with_context(|| format!("Failed to open storage at {}", path.display()))?;
        Ok(Self {
            config,
            store: Arc::new(store),
            clock: system_clock(),
        })
    }

    pub fn media(&self) -> MediaLibrary {
        MediaLibrary::new(self.store.clone(), self.clock.clone())
    }

    pub fn instagram(&self) -> anyhow::Result<InstagramClient> {
        Ok(InstagramClient::new(
            self.config.instagram.clone(),
            self.store.clone(),
        )?)
    }

    /// Import `file` into a fresh deck, cycling uploaded backgrounds first.
    pub fn load_deck(&self, file: &Path) -> anyhow::Result<Deck> {
        let uploads = load_import_file(file)?;
        let backgrounds = self.media().background_urls()?;
        let mut deck = Deck::new();
        deck.import(uploads, &backgrounds, self.clock.as_ref());
        Ok(deck)
    }

    /// Exporter whose relative backgrounds resolve next to the import file.
    pub fn exporter(&self, font: Option<PathBuf>, base_dir: &Path) -> anyhow::Result<Exporter> {
        let font = font.or_else(|| self.config.render.font_path.clone());
        let rasterizer = ImageRasterizer::load(font.as_deref())?;
        let backgrounds = DefaultBackgroundLoader::new()?.with_base_dir(base_dir);
        Ok(Exporter::new(
            Arc::new(rasterizer),
            Arc::new(backgrounds),
            ExportOptions::from(&self.config.render),
        ))
    }

    /// Mount `post` as a card and write its export to `destination`.
    pub async fn download_post(
        &self,
        exporter: &Exporter,
        post: &Post,
        destination: &Path,
    ) -> anyhow::Result<RenderedImage> {
        let mut doc = Document::new();
        build_post_card(&mut doc, post, &CardState::default());
        let image = exporter
            .download_image(&mut doc, &post.id, destination)
            .await
            .with_context(|| format!("Failed to export \"{}\"", post.headline))?;
        Ok(image)
    }

    /// Mount `post` as a card and export it.
    pub async fn render_post(
        &self,
        exporter: &Exporter,
        post: &Post,
    ) -> anyhow::Result<RenderedImage> {
        let mut doc = Document::new();
        build_post_card(&mut doc, post, &CardState::default());
        let image = exporter
            .render_to_image(&mut doc, &post.id)
            .await
            .with_context(|| format!("Failed to render \"{}\"", post.headline))?;
        Ok(image)
    }
}

/// Post at 1-based `index`.
pub fn select(deck: &Deck, index: usize) -> anyhow::Result<&Post> {
    index
        .checked_sub(1)
        .and_then(|i| deck.posts().get(i))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No post at index {index} (file has {} post(s), indices start at 1)",
                deck.len()
            )
        })
}

/// Output path for each post, all stamped with the same `timestamp_ms`.
/// Posts whose filenames would collide get their 1-based position appended.
pub fn export_paths(posts: &[&Post], output: &Path, timestamp_ms: i64) -> Vec<PathBuf> {
    let names: Vec<String> = posts
        .iter()
        .map(|post| post.export_filename(timestamp_ms))
        .collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &names {
        *counts.entry(name.as_str()).or_default() += 1;
    }
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if counts[name.as_str()] > 1 {
                let stem = name.strip_suffix(".png").unwrap_or(name);
                output.join(format!("{stem}_{}.png", i + 1))
            } else {
                output.join(name)
            }
        })
        .collect()
}

/// Directory relative backgrounds are resolved against.
pub fn base_dir(file: &Path) -> PathBuf {
    file.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Shorten long references such as data URLs for display.
pub fn preview(s: &str) -> String {
    const MAX: usize = 60;
    if s.chars().count() <= MAX {
        s.to_string()
    } else {
        let head: String = s.chars().take(MAX).collect();
        format!("{head}…")
    }
}
