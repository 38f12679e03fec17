//! Publish or schedule a single post.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use postcraft_post_model::deck::Deck;
use postcraft_post_model::post::Post;
use postcraft_post_model::schedule::{PublishRequest, ScheduleRequest};
use postcraft_render_engine::background::png_data_url;

use crate::context::{base_dir, select, Context};

/// The image Instagram fetches: the given URL, or the rendered card inlined
/// as a data URL.
async fn image_url_for(
    ctx: &Context,
    file: &std::path::Path,
    post: &Post,
    image_url: Option<String>,
    font: Option<PathBuf>,
) -> anyhow::Result<String> {
    if let Some(url) = image_url {
        return Ok(url);
    }
    let exporter = ctx.exporter(font, &base_dir(file))?;
    let image = ctx.render_post(&exporter, post).await?;
    tracing::debug!(bytes = image.png.len(), "Sending rendered image inline");
    Ok(png_data_url(&image.png))
}

pub async fn publish(
    ctx: &Context,
    file: PathBuf,
    index: usize,
    image_url: Option<String>,
    font: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut deck = ctx.load_deck(&file)?;
    let post = select(&deck, index)?.clone();
    let client = ctx.instagram()?;
    if !client.is_logged_in() {
        anyhow::bail!("Not connected to Instagram. Run `postcraft auth url` first.");
    }

    let image_url = image_url_for(ctx, &file, &post, image_url, font).await?;
    let media_id = client
        .publish_post(&PublishRequest {
            post_id: post.id.clone(),
            image_url,
            caption: post.caption.clone(),
            hashtags: post.hashtags.clone(),
        })
        .await?;

    deck.mark_published(&post.id)?;
    println!("Published \"{}\" as media {media_id}", post.headline);
    print_stats(&deck);
    Ok(())
}

pub async fn schedule(
    ctx: &Context,
    file: PathBuf,
    index: usize,
    at: &str,
    image_url: Option<String>,
    font: Option<PathBuf>,
) -> anyhow::Result<()> {
    let scheduled_time: DateTime<Utc> = DateTime::parse_from_rfc3339(at)
        .map_err(|e| anyhow::anyhow!("Invalid --at {at:?}: {e}"))?
        .with_timezone(&Utc);
    if scheduled_time <= ctx.clock.now() {
        anyhow::bail!("Scheduled time {at} is in the past");
    }

    let mut deck = ctx.load_deck(&file)?;
    let post = select(&deck, index)?.clone();
    let client = ctx.instagram()?;
    if !client.is_logged_in() {
        anyhow::bail!("Not connected to Instagram. Run `postcraft auth url` first.");
    }

    let image_url = image_url_for(ctx, &file, &post, image_url, font).await?;
    let scheduled_id = client
        .schedule_post(&ScheduleRequest {
            post_id: post.id.clone(),
            scheduled_time,
            image_url,
            caption: post.caption.clone(),
            hashtags: post.hashtags.clone(),
        })
        .await?;

    println!(
        "Scheduled \"{}\" for {} (id {scheduled_id})",
        post.headline,
        scheduled_time.to_rfc3339()
    );
    deck.set_scheduled(&post.id, Some(scheduled_time))?;
    print_stats(&deck);
    Ok(())
}

fn print_stats(deck: &Deck) {
    let stats = deck.stats();
    let scheduled = deck
        .posts()
        .iter()
        .filter(|p| p.scheduled_time.is_some())
        .count();
    println!(
        "Batch: {} post(s), {} approved, {scheduled} scheduled",
        stats.total, stats.approved
    );
}
