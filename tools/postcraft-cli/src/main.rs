//! Postcraft CLI: import posts, export them as images, and publish.
//!
//! Usage:
//!   postcraft import <FILE>            Validate an import file and list its posts
//!   postcraft render <FILE>            Export post images as PNG
//!   postcraft font-size <TEXT>         Show the sizes a headline gets
//!   postcraft media <ACTION>           Manage uploaded backgrounds
//!   postcraft auth <ACTION>            Connect an Instagram account
//!   postcraft publish <FILE> -i N      Publish one post now
//!   postcraft schedule <FILE> -i N     Schedule one post
//!   postcraft scheduled <ACTION>       List or cancel scheduled posts

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod context;

#[derive(Parser)]
#[command(
    name = "postcraft",
    about = "Turn post batches into publish-ready images",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an import file and list the posts it would create
    Import {
        /// JSON array of {headline, caption, hashtags}
        file: PathBuf,
    },

    /// Export post images as PNG
    Render {
        /// Import file to render
        file: PathBuf,

        /// 1-based position of a single post to render (default: all)
        #[arg(short, long)]
        index: Option<usize>,

        /// Output directory (default: configured output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TrueType font for headlines
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Show the export size and editing bucket for a headline
    FontSize {
        text: String,

        /// Editing container width in pixels
        #[arg(long, default_value = "320")]
        width: f64,
    },

    /// Manage uploaded backgrounds
    Media {
        #[command(subcommand)]
        action: commands::media::MediaAction,
    },

    /// Connect or disconnect an Instagram account
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },

    /// Publish one post immediately
    Publish {
        file: PathBuf,

        /// 1-based position of the post in the import file
        #[arg(short, long)]
        index: usize,

        /// Publicly reachable image URL (default: the rendered PNG as a data URL)
        #[arg(long)]
        image_url: Option<String>,

        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Create a media container now and record the post as scheduled
    Schedule {
        file: PathBuf,

        #[arg(short, long)]
        index: usize,

        /// RFC 3339 timestamp, e.g. 2026-11-01T09:30:00Z
        #[arg(long)]
        at: String,

        #[arg(long)]
        image_url: Option<String>,

        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// List or cancel scheduled posts
    Scheduled {
        #[command(subcommand)]
        action: commands::scheduled::ScheduledAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = postcraft_common::config::AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    postcraft_common::logging::init_logging(&config.logging);

    let ctx = context::Context::new(config)?;

    match cli.command {
        Commands::Import { file } => commands::import::run(&ctx, file),
        Commands::Render {
            file,
            index,
            output,
            font,
        } => commands::render::run(&ctx, file, index, output, font).await,
        Commands::FontSize { text, width } => commands::font_size::run(&text, width),
        Commands::Media { action } => commands::media::run(&ctx, action),
        Commands::Auth { action } => commands::auth::run(&ctx, action).await,
        Commands::Publish {
            file,
            index,
            image_url,
            font,
        } => commands::publish::publish(&ctx, file, index, image_url, font).await,
        Commands::Schedule {
            file,
            index,
            at,
            image_url,
            font,
        } => commands::publish::schedule(&ctx, file, index, &at, image_url, font).await,
        Commands::Scheduled { action } => commands::scheduled::run(&ctx, action),
    }
}
