//! List or cancel scheduled posts.

use clap::Subcommand;

use crate::context::Context;

#[derive(Subcommand)]
pub enum ScheduledAction {
    /// List posts waiting to go out
    List,
    /// Cancel a scheduled post by id
    Cancel { id: String },
}

pub fn run(ctx: &Context, action: ScheduledAction) -> anyhow::Result<()> {
    let client = ctx.instagram()?;
    match action {
        ScheduledAction::List => {
            let scheduled = client.scheduled_posts()?;
            if scheduled.is_empty() {
                println!("No scheduled posts.");
            }
            for entry in scheduled {
                println!(
                    "  {}  post {}  at {}",
                    entry.id,
                    entry.post_id,
                    entry.scheduled_time.to_rfc3339()
                );
            }
        }
        ScheduledAction::Cancel { id } => {
            if client.cancel_scheduled_post(&id)? {
                println!("Cancelled {id}");
            } else {
                anyhow::bail!("No scheduled post with id {id}");
            }
        }
    }
    Ok(())
}
