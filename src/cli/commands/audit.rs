//! audit command - Show a site's audit log

use anyhow::Result;

use super::Session;
use crate::cli::Context;
use crate::core::types::SiteId;
use crate::ui::output;

/// Print the audit entries of a site, oldest first.
///
/// Reading the log is not gated; it only needs a readable store.
pub async fn audit(ctx: &Context, site: SiteId) -> Result<()> {
    let session = Session::open(ctx)?;
    let entries = session.engine.services().audit.entries(site).await?;

    if ctx.json {
        output::json(&entries)?;
        return Ok(());
    }

    for entry in &entries {
        let actor = entry
            .admin_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let added_at = entry.added_at.format("%Y-%m-%d %H:%M:%S");
        output::print(
            output::row(&[&added_at, &actor, &entry.action, &entry.summary]),
            ctx.verbosity,
        );
    }
    Ok(())
}
