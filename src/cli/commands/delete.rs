//! delete command - Preview or recycle contents of a channel

use anyhow::Result;
use serde_json::Value;

use super::Session;
use crate::cli::Context;
use crate::core::types::{ChannelId, ContentId, SiteId};
use crate::engine::delete::CHECK_STATE_FIELD;
use crate::engine::{DeleteConfirmRequest, DeleteSubmitRequest};
use crate::ui::output;

/// List the contents a delete would affect.
pub async fn confirm(
    ctx: &Context,
    site: SiteId,
    channel: ChannelId,
    ids: Vec<ContentId>,
) -> Result<()> {
    let session = Session::open(ctx)?;
    let request = DeleteConfirmRequest {
        site_id: site,
        channel_id: channel,
        content_ids: ids,
    };
    let contents = session
        .engine
        .delete_confirmation(&session.caller, &request)
        .await?;

    if ctx.json {
        output::json(&contents)?;
        return Ok(());
    }

    if contents.is_empty() {
        output::print("No matching contents.", ctx.verbosity);
        return Ok(());
    }
    for fields in &contents {
        let field = |name: &str| match fields.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        output::print(
            output::row(&[&field("id"), &field(CHECK_STATE_FIELD), &field("title")]),
            ctx.verbosity,
        );
    }
    Ok(())
}

/// Move contents to the recycle bin.
pub async fn submit(
    ctx: &Context,
    site: SiteId,
    channel: ChannelId,
    ids: Vec<ContentId>,
    retain_files: bool,
) -> Result<()> {
    let session = Session::open(ctx)?;
    let request = DeleteSubmitRequest {
        site_id: site,
        channel_id: channel,
        content_ids: ids,
        is_retain_files: retain_files,
    };
    let result = session
        .engine
        .delete_contents(&session.caller, &request)
        .await;

    // Recycling may have committed even when a later step failed.
    session.save()?;
    let outcome = result?;

    if ctx.json {
        output::json(&outcome)?;
        return Ok(());
    }

    if outcome.cleanup_failures > 0 {
        output::warn(
            format!(
                "generated files of {} content item(s) could not be removed",
                outcome.cleanup_failures
            ),
            ctx.verbosity,
        );
    }
    output::print("Contents moved to the recycle bin.", ctx.verbosity);
    Ok(())
}
