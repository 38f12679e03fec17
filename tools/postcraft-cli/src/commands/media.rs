//! Manage uploaded backgrounds.

use std::path::PathBuf;

use clap::Subcommand;

use crate::context::{preview, Context};

#[derive(Subcommand)]
pub enum MediaAction {
    /// Upload an image or video file
    Upload { path: PathBuf },
    /// List uploads, newest first
    List,
    /// Delete one upload
    Delete { id: String },
    /// Delete every upload
    Clear,
}

pub fn run(ctx: &Context, action: MediaAction) -> anyhow::Result<()> {
    let library = ctx.media();
    match action {
        MediaAction::Upload { path } => {
            let media = library.upload_file(&path)?;
            println!("Uploaded {} as {} ({:?})", media.name, media.id, media.kind);
        }
        MediaAction::List => {
            let all = library.uploaded_media()?;
            if all.is_empty() {
                println!("No uploaded media.");
            }
            for media in all {
                println!(
                    "  {}  {:<6} {}  {}  {}",
                    media.id,
                    format!("{:?}", media.kind).to_lowercase(),
                    media.uploaded_at.format("%Y-%m-%d %H:%M"),
                    media.name,
                    preview(&media.url)
                );
            }
        }
        MediaAction::Delete { id } => {
            if library.media_by_id(&id)?.is_none() {
                anyhow::bail!("No uploaded media with id {id}");
            }
            library.delete_media(&id)?;
            println!("Deleted {id}");
        }
        MediaAction::Clear => {
            library.clear_all()?;
            println!("Cleared all uploaded media.");
        }
    }
    Ok(())
}
