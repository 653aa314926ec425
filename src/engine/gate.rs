//! engine::gate
//!
//! Permission gating.
//!
//! Every operation gates before touching a repository, so an unauthorized
//! caller cannot learn whether a site or channel exists.
//!
//! | principal                     | result            |
//! |-------------------------------|-------------------|
//! | not logged in                 | `Unauthenticated` |
//! | logged in, check returns false| `Unauthorized`    |
//! | logged in, check returns true | proceed           |

use tracing::debug;

use super::EngineError;
use crate::auth::{ChannelPermission, PermissionOracle, Principal, SitePermission};
use crate::core::types::{ChannelId, SiteId};

/// Require a site permission.
pub async fn require_site(
    oracle: &dyn PermissionOracle,
    principal: &Principal,
    site_id: SiteId,
    permission: SitePermission,
) -> Result<(), EngineError> {
    if !principal.is_logged_in() {
        debug!(%site_id, %permission, "gate: unauthenticated");
        return Err(EngineError::Unauthenticated);
    }
    if !oracle
        .has_site_permission(principal, site_id, permission)
        .await
    {
        debug!(%site_id, %permission, "gate: denied");
        return Err(EngineError::Unauthorized {
            permission: permission.into(),
        });
    }
    Ok(())
}

/// Require a channel permission.
pub async fn require_channel(
    oracle: &dyn PermissionOracle,
    principal: &Principal,
    site_id: SiteId,
    channel_id: ChannelId,
    permission: ChannelPermission,
) -> Result<(), EngineError> {
    if !principal.is_logged_in() {
        debug!(%site_id, %channel_id, %permission, "gate: unauthenticated");
        return Err(EngineError::Unauthenticated);
    }
    if !oracle
        .has_channel_permission(principal, site_id, channel_id, permission)
        .await
    {
        debug!(%site_id, %channel_id, %permission, "gate: denied");
        return Err(EngineError::Unauthorized {
            permission: permission.into(),
        });
    }
    Ok(())
}
