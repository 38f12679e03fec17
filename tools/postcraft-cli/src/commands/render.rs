//! Export post images to PNG files.

use std::path::PathBuf;

use crate::context::{base_dir, export_paths, select, Context};

pub async fn run(
    ctx: &Context,
    file: PathBuf,
    index: Option<usize>,
    output: Option<PathBuf>,
    font: Option<PathBuf>,
) -> anyhow::Result<()> {
    let deck = ctx.load_deck(&file)?;
    let posts = match index {
        Some(i) => vec![select(&deck, i)?],
        None => deck.posts().iter().collect(),
    };
    let output = output.unwrap_or_else(|| ctx.config.render.output_dir.clone());
    let exporter = ctx.exporter(font, &base_dir(&file))?;

    let (width, height) = exporter.options().capture_options().physical_size()?;
    println!("Rendering {} post(s) at {width}x{height}", posts.len());

    let paths = export_paths(&posts, &output, ctx.clock.now_ms());
    let mut failed = 0usize;
    for (post, path) in posts.into_iter().zip(paths) {
        let result = ctx
            .download_post(&exporter, post, &path)
            .await
            .map(|image| (path, image));

        match result {
            Ok((path, image)) => {
                println!(
                    "  {} -> {} ({}px)",
                    post.headline,
                    path.display(),
                    image.font_size
                );
                for warning in &image.warnings {
                    println!("    warning: {warning}");
                }
            }
            Err(e) => {
                failed += 1;
                println!("  {} -> failed: {e:#}", post.headline);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} post(s) failed to render");
    }
    println!("Done.");
    Ok(())
}
