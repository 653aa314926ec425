//! auth
//!
//! Principals and permission checks.
//!
//! # Modules
//!
//! - [`permissions`] - Typed site and channel permission keys
//! - [`oracle`] - The `PermissionOracle` trait and the bundled grant table
//!
//! A [`Principal`] is resolved once per request and dropped afterwards. The
//! engine never inspects grants directly; it asks a [`PermissionOracle`].

pub mod oracle;
pub mod permissions;

pub use oracle::{AdminGrants, ChannelGrant, GrantTable, PermissionOracle, SiteGrant};
pub use permissions::{ChannelPermission, Permission, SitePermission};

use serde::{Deserialize, Serialize};

use crate::core::types::AdminId;

/// A CMS administrator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Administrator {
    pub id: AdminId,
    pub user_name: String,
}

/// The actor a request runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    admin_id: Option<AdminId>,
    user_name: Option<String>,
}

impl Principal {
    /// A logged-in administrator.
    pub fn admin(admin: &Administrator) -> Self {
        Self {
            admin_id: Some(admin.id),
            user_name: Some(admin.user_name.clone()),
        }
    }

    /// A caller that failed (or skipped) authentication.
    pub fn anonymous() -> Self {
        Self {
            admin_id: None,
            user_name: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.admin_id.is_some()
    }

    pub fn admin_id(&self) -> Option<AdminId> {
        self.admin_id
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }
}
