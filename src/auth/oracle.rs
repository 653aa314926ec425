//! auth::oracle
//!
//! Permission oracle trait and the grant-table policy.
//!
//! # Design
//!
//! Checks are boolean capability queries: `(principal, scope, key) -> bool`.
//! An oracle never errors for "not authorized"; it returns `false`.
//!
//! # Policy
//!
//! [`GrantTable`] resolves checks from per-admin grants:
//! - super administrators pass every check
//! - site permissions are granted per site
//! - channel permissions are granted per channel, or site-wide for every
//!   channel of a site
//!
//! # Example
//!
//! ```
//! use cascadework::auth::{
//!     AdminGrants, Administrator, ChannelGrant, ChannelPermission, GrantTable,
//!     PermissionOracle, Principal, SiteGrant,
//! };
//! use cascadework::core::types::{AdminId, ChannelId, SiteId};
//!
//! # tokio_test::block_on(async {
//! let table = GrantTable::new(vec![AdminGrants {
//!     admin_id: AdminId::new(2),
//!     super_admin: false,
//!     sites: vec![SiteGrant {
//!         site_id: SiteId::new(1),
//!         site_permissions: vec![],
//!         channel_permissions: vec![],
//!         channels: vec![ChannelGrant {
//!             channel_id: ChannelId::new(2),
//!             permissions: vec![ChannelPermission::ContentDelete],
//!         }],
//!     }],
//! }]);
//!
//! let editor = Principal::admin(&Administrator { id: AdminId::new(2), user_name: "editor".into() });
//! assert!(table
//!     .has_channel_permission(&editor, SiteId::new(1), ChannelId::new(2), ChannelPermission::ContentDelete)
//!     .await);
//! assert!(!table
//!     .has_channel_permission(&editor, SiteId::new(1), ChannelId::new(3), ChannelPermission::ContentDelete)
//!     .await);
//! # });
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::permissions::{ChannelPermission, SitePermission};
use super::Principal;
use crate::core::types::{AdminId, ChannelId, SiteId};

/// Answers permission checks for a principal.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    /// Whether the principal holds `permission` on the whole site.
    async fn has_site_permission(
        &self,
        principal: &Principal,
        site_id: SiteId,
        permission: SitePermission,
    ) -> bool;

    /// Whether the principal holds `permission` on one channel of a site.
    async fn has_channel_permission(
        &self,
        principal: &Principal,
        site_id: SiteId,
        channel_id: ChannelId,
        permission: ChannelPermission,
    ) -> bool;
}

/// Grants held by one administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminGrants {
    pub admin_id: AdminId,
    #[serde(default)]
    pub super_admin: bool,
    #[serde(default)]
    pub sites: Vec<SiteGrant>,
}

/// Grants on one site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteGrant {
    pub site_id: SiteId,
    #[serde(default)]
    pub site_permissions: Vec<SitePermission>,
    /// Channel permissions that hold on every channel of the site.
    #[serde(default)]
    pub channel_permissions: Vec<ChannelPermission>,
    #[serde(default)]
    pub channels: Vec<ChannelGrant>,
}

/// Grants on one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelGrant {
    pub channel_id: ChannelId,
    #[serde(default)]
    pub permissions: Vec<ChannelPermission>,
}

/// Grant-table backed permission oracle.
#[derive(Debug, Clone, Default)]
pub struct GrantTable {
    grants: HashMap<AdminId, AdminGrants>,
}

impl GrantTable {
    /// Build a table from per-admin grants. Later entries for the same admin
    /// replace earlier ones.
    pub fn new(grants: Vec<AdminGrants>) -> Self {
        Self {
            grants: grants.into_iter().map(|g| (g.admin_id, g)).collect(),
        }
    }

    /// Grants of a logged-in principal.
    fn grants_of(&self, principal: &Principal) -> Option<&AdminGrants> {
        principal
            .admin_id()
            .and_then(|admin_id| self.grants.get(&admin_id))
    }

    fn site_grant<'a>(grants: &'a AdminGrants, site_id: SiteId) -> Option<&'a SiteGrant> {
        grants.sites.iter().find(|s| s.site_id == site_id)
    }

    /// Snapshot of all grants, ordered by admin id.
    pub fn to_vec(&self) -> Vec<AdminGrants> {
        let mut grants: Vec<AdminGrants> = self.grants.values().cloned().collect();
        grants.sort_by_key(|g| g.admin_id);
        grants
    }
}

#[async_trait]
impl PermissionOracle for GrantTable {
    async fn has_site_permission(
        &self,
        principal: &Principal,
        site_id: SiteId,
        permission: SitePermission,
    ) -> bool {
        let Some(grants) = self.grants_of(principal) else {
            return false;
        };
        if grants.super_admin {
            return true;
        }
        Self::site_grant(grants, site_id)
            .map(|site| site.site_permissions.contains(&permission))
            .unwrap_or(false)
    }

    async fn has_channel_permission(
        &self,
        principal: &Principal,
        site_id: SiteId,
        channel_id: ChannelId,
        permission: ChannelPermission,
    ) -> bool {
        let Some(grants) = self.grants_of(principal) else {
            return false;
        };
        if grants.super_admin {
            return true;
        }
        let Some(site) = Self::site_grant(grants, site_id) else {
            return false;
        };
        site.channel_permissions.contains(&permission)
            || site
                .channels
                .iter()
                .any(|c| c.channel_id == channel_id && c.permissions.contains(&permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Administrator;

    fn principal(id: u32) -> Principal {
        Principal::admin(&Administrator {
            id: AdminId::new(id),
            user_name: format!("admin{}", id),
        })
    }

    fn table() -> GrantTable {
        GrantTable::new(vec![
            AdminGrants {
                admin_id: AdminId::new(1),
                super_admin: true,
                sites: vec![],
            },
            AdminGrants {
                admin_id: AdminId::new(2),
                super_admin: false,
                sites: vec![SiteGrant {
                    site_id: SiteId::new(1),
                    site_permissions: vec![SitePermission::ContentsSearch],
                    channel_permissions: vec![ChannelPermission::ContentEdit],
                    channels: vec![ChannelGrant {
                        channel_id: ChannelId::new(2),
                        permissions: vec![ChannelPermission::ContentDelete],
                    }],
                }],
            },
        ])
    }

    #[tokio::test]
    async fn super_admin_passes_everything() {
        let table = table();
        let p = principal(1);
        assert!(
            table
                .has_site_permission(&p, SiteId::new(99), SitePermission::Library)
                .await
        );
        assert!(
            table
                .has_channel_permission(
                    &p,
                    SiteId::new(99),
                    ChannelId::new(5),
                    ChannelPermission::ChannelEdit
                )
                .await
        );
    }

    #[tokio::test]
    async fn anonymous_fails_everything() {
        let table = table();
        let p = Principal::anonymous();
        assert!(
            !table
                .has_site_permission(&p, SiteId::new(1), SitePermission::ContentsSearch)
                .await
        );
    }

    #[tokio::test]
    async fn site_permissions_are_per_site() {
        let table = table();
        let p = principal(2);
        assert!(
            table
                .has_site_permission(&p, SiteId::new(1), SitePermission::ContentsSearch)
                .await
        );
        assert!(
            !table
                .has_site_permission(&p, SiteId::new(2), SitePermission::ContentsSearch)
                .await
        );
        assert!(
            !table
                .has_site_permission(&p, SiteId::new(1), SitePermission::Library)
                .await
        );
    }

    #[tokio::test]
    async fn channel_grants_are_exact_or_site_wide() {
        let table = table();
        let p = principal(2);
        let site = SiteId::new(1);
        assert!(
            table
                .has_channel_permission(&p, site, ChannelId::new(2), ChannelPermission::ContentDelete)
                .await
        );
        assert!(
            !table
                .has_channel_permission(&p, site, ChannelId::new(3), ChannelPermission::ContentDelete)
                .await
        );
        // Site-wide grant.
        assert!(
            table
                .has_channel_permission(&p, site, ChannelId::new(3), ChannelPermission::ContentEdit)
                .await
        );
    }

    #[test]
    fn to_vec_is_sorted() {
        let ids: Vec<AdminId> = table().to_vec().iter().map(|g| g.admin_id).collect();
        assert_eq!(ids, vec![AdminId::new(1), AdminId::new(2)]);
    }
}
