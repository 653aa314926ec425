//! permissions command - List permission keys

use anyhow::Result;

use crate::auth::{ChannelPermission, SitePermission};
use crate::cli::Context;
use crate::ui::output;

#[derive(serde::Serialize)]
struct KeyInfo {
    key: &'static str,
    scope: &'static str,
    description: &'static str,
}

/// Print every permission key with its scope.
pub fn permissions(ctx: &Context) -> Result<()> {
    let site = SitePermission::ALL.iter().map(|p| KeyInfo {
        key: p.key(),
        scope: "site",
        description: p.description(),
    });
    let channel = ChannelPermission::ALL.iter().map(|p| KeyInfo {
        key: p.key(),
        scope: "channel",
        description: p.description(),
    });
    let keys: Vec<KeyInfo> = site.chain(channel).collect();

    if ctx.json {
        output::json(&keys)?;
        return Ok(());
    }
    for info in &keys {
        output::print(
            format!("{:<24}{:<9}{}", info.key, info.scope, info.description),
            ctx.verbosity,
        );
    }
    Ok(())
}
