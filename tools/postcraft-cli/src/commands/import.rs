//! Validate an import file and list its posts.

use std::path::PathBuf;

use crate::context::{preview, Context};

pub fn run(ctx: &Context, file: PathBuf) -> anyhow::Result<()> {
    println!("Importing: {}", file.display());

    let deck = ctx.load_deck(&file)?;

    for (i, post) in deck.posts().iter().enumerate() {
        println!("\n  [{}] {}", i + 1, post.headline);
        println!("      Caption: {}", preview(&post.caption));
        if !post.hashtags.is_empty() {
            let tags: Vec<String> = post.hashtags.iter().map(|t| format!("#{t}")).collect();
            println!("      Tags: {}", tags.join(" "));
        }
        println!("      Background: {}", preview(&post.background));
    }

    println!("\n{} post(s) ready.", deck.len());
    Ok(())
}
