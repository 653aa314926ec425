//! tree command - Show a site's channel tree with content counts

use anyhow::Result;

use super::Session;
use crate::cli::Context;
use crate::core::types::{ChannelId, SiteId};
use crate::engine::TreeRequest;
use crate::ui::output;

/// Show a site's channel tree.
pub async fn tree(
    ctx: &Context,
    site: SiteId,
    channel: Option<ChannelId>,
    reload: bool,
) -> Result<()> {
    let session = Session::open(ctx)?;
    let request = TreeRequest {
        site_id: site,
        channel_id: channel,
        reload,
    };
    let result = session.engine.tree(&session.caller, &request).await?;

    if ctx.json {
        output::json(&result)?;
        return Ok(());
    }

    output::print(
        output::format_cascade(&result.root, |c| c.count.to_string()),
        ctx.verbosity,
    );
    if let Some(permissions) = &result.permissions {
        let granted: Vec<&str> = [
            ("add", permissions.is_add),
            ("delete", permissions.is_delete),
            ("edit", permissions.is_edit),
            ("arrange", permissions.is_arrange),
            ("translate", permissions.is_translate),
            ("check", permissions.is_check),
            ("create", permissions.is_create),
            ("channel-edit", permissions.is_channel_edit),
        ]
        .into_iter()
        .filter_map(|(name, allowed)| allowed.then_some(name))
        .collect();
        output::print(
            format!("\nPermissions: {}", granted.join(", ")),
            ctx.verbosity,
        );
    }
    Ok(())
}
