//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens a [`Session`] on the store file
//! 2. Calls the engine to execute the command
//! 3. Saves the store if the command mutated it
//! 4. Formats and displays output
//!
//! Handlers do NOT check permissions or touch repositories directly.

mod audit;
mod completion;
mod delete;
mod library;
mod permissions;
mod session;
mod tree;

// Re-export command functions for testing and direct invocation
pub use audit::audit;
pub use completion::completion;
pub use delete::{confirm as delete_confirm, submit as delete_submit};
pub use library::library;
pub use permissions::permissions;
pub use session::Session;
pub use tree::tree;

use anyhow::Result;

use super::args::{Command, DeleteAction};
use super::Context;

/// Dispatch a command to its handler.
pub async fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Tree {
            site,
            channel,
            reload,
        } => tree::tree(ctx, site, channel, reload).await,
        Command::Delete { action } => match action {
            DeleteAction::Confirm { site, channel, ids } => {
                delete::confirm(ctx, site, channel, ids).await
            }
            DeleteAction::Submit {
                site,
                channel,
                ids,
                retain_files,
            } => delete::submit(ctx, site, channel, ids, retain_files).await,
        },
        Command::Library { action } => library::library(ctx, action).await,
        Command::Audit { site } => audit::audit(ctx, site).await,
        Command::Permissions => permissions::permissions(ctx),
        Command::Completion { shell } => completion::completion(shell),
    }
}
