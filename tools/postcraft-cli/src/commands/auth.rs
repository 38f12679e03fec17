//! Connect or disconnect an Instagram account.

use clap::Subcommand;
use postcraft_publisher::InstagramClient;

use crate::context::Context;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Print the authorization URL to open in a browser
    Url,
    /// Finish authorization with the code or the full callback URL
    Login { code: String },
    /// Check the stored token against the API
    Status,
    /// Forget the stored token
    Logout,
}

pub async fn run(ctx: &Context, action: AuthAction) -> anyhow::Result<()> {
    let mut client = ctx.instagram()?;
    match action {
        AuthAction::Url => {
            println!("Open this URL and approve access:\n\n  {}\n", client.authorize_url()?);
            println!("Then run: postcraft auth login <CALLBACK_URL>");
        }
        AuthAction::Login { code } => {
            let code = if code.contains("://") {
                InstagramClient::parse_callback(&code)?
            } else {
                code
            };
            client.complete_authorization(&code).await?;
            println!("Connected to Instagram.");
        }
        AuthAction::Status => {
            if !client.is_logged_in() {
                println!("Not connected.");
            } else if client.is_connected().await? {
                let info = client.user_info().await?;
                println!(
                    "Connected as {} (id {})",
                    info.username.as_deref().unwrap_or("<unknown>"),
                    info.id
                );
                if let Some(count) = info.media_count {
                    println!("  Media: {count}");
                }
                if let Some(count) = info.followers_count {
                    println!("  Followers: {count}");
                }
            } else {
                println!("Stored token was rejected; you have been logged out.");
            }
        }
        AuthAction::Logout => {
            client.disconnect()?;
            println!("Disconnected.");
        }
    }
    Ok(())
}
