//! engine::tree
//!
//! The contents-search tree: a channel cascade with content counts plus the
//! lookups a content list needs.
//!
//! # Modes
//!
//! - `reload = false`: full response (site URL, group and tag names, check
//!   levels, list columns, permission flags)
//! - `reload = true`: only the tree, for callers that keep the rest cached
//!
//! The tree itself is recomputed on every call in both modes.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::cancel::cancellable;
use super::cascade::Cascade;
use super::gate::require_site;
use super::{Caller, Engine, EngineError};
use crate::auth::{ChannelPermission, SitePermission};
use crate::core::check::{checked_levels, CheckBox};
use crate::core::columns::{content_list_columns, ContentColumn, PageType};
use crate::core::model::{Channel, ChannelSummary, Site};
use crate::core::types::{ChannelId, SiteId};
use crate::store::traits::StoreError;

/// Tree query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRequest {
    pub site_id: SiteId,
    /// Subtree root; defaults to the site's root channel.
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    #[serde(default)]
    pub reload: bool,
}

/// Per-channel metric of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCount {
    pub count: u64,
}

/// What the principal may do in the tree's root channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub is_add: bool,
    pub is_delete: bool,
    pub is_edit: bool,
    pub is_arrange: bool,
    pub is_translate: bool,
    pub is_check: bool,
    pub is_create: bool,
    pub is_channel_edit: bool,
}

/// Tree query result. Optional fields are only set when `reload` is false.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeResult {
    pub root: Cascade<ContentCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_levels: Option<Vec<CheckBox<i32>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ContentColumn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
}

impl TreeResult {
    /// Whether the auxiliary lookups are present.
    pub fn is_full(&self) -> bool {
        self.site_url.is_some()
            && self.group_names.is_some()
            && self.tag_names.is_some()
            && self.checked_levels.is_some()
            && self.columns.is_some()
            && self.permissions.is_some()
    }
}

impl Engine {
    /// Channel tree with content counts.
    ///
    /// Requires the `cms_contentsSearch` site permission.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` / `Unauthorized` from the gate
    /// - `NotFound` if the site or channel does not exist, or the channel
    ///   belongs to another site
    pub async fn tree(
        &self,
        caller: &Caller,
        request: &TreeRequest,
    ) -> Result<TreeResult, EngineError> {
        require_site(
            self.services.oracle.as_ref(),
            &caller.principal,
            request.site_id,
            SitePermission::ContentsSearch,
        )
        .await?;

        let site = cancellable(&caller.cancel, self.services.sites.get_site(request.site_id))
            .await??
            .ok_or_else(|| EngineError::NotFound(format!("site {}", request.site_id)))?;
        let channel_id = request.channel_id.unwrap_or(site.root_channel_id);
        let channel = cancellable(&caller.cancel, self.services.channels.get_channel(channel_id))
            .await??
            .filter(|c| c.site_id == site.id)
            .ok_or_else(|| EngineError::NotFound(format!("channel {}", channel_id)))?;

        let contents = &self.services.contents;
        let counted_site = &site;
        let root = self
            .cascade(caller, &site, channel.id, |summary: ChannelSummary| async move {
                let count = contents.count_content(counted_site, &summary).await?;
                Ok::<_, StoreError>(ContentCount { count })
            })
            .await?;

        info!(
            site_id = %site.id,
            channel_id = %channel.id,
            nodes = root.node_count(),
            reload = request.reload,
            "tree query"
        );

        if request.reload {
            return Ok(TreeResult {
                root,
                site_url: None,
                group_names: None,
                tag_names: None,
                checked_levels: None,
                columns: None,
                permissions: None,
            });
        }

        let site_url = cancellable(&caller.cancel, self.services.sites.site_url(&site)).await??;
        let group_names =
            cancellable(&caller.cancel, self.services.groups.group_names(site.id)).await??;
        let tag_names = cancellable(&caller.cancel, self.services.tags.tag_names(site.id)).await??;
        let permissions = self.permissions(caller, &site, &channel).await?;

        Ok(TreeResult {
            root,
            site_url: Some(site_url),
            group_names: Some(group_names),
            tag_names: Some(tag_names),
            checked_levels: Some(checked_levels(&site, true)),
            columns: Some(content_list_columns(
                &site,
                &channel,
                PageType::SearchContents,
            )),
            permissions: Some(permissions),
        })
    }

    async fn permissions(
        &self,
        caller: &Caller,
        site: &Site,
        channel: &Channel,
    ) -> Result<Permissions, EngineError> {
        let oracle = self.services.oracle.as_ref();
        let principal = &caller.principal;
        let has = move |permission: ChannelPermission| {
            cancellable(
                &caller.cancel,
                oracle.has_channel_permission(principal, site.id, channel.id, permission),
            )
        };

        let create_contents = cancellable(
            &caller.cancel,
            oracle.has_site_permission(principal, site.id, SitePermission::CreateContents),
        )
        .await?;

        Ok(Permissions {
            is_add: has(ChannelPermission::ContentAdd).await?,
            is_delete: has(ChannelPermission::ContentDelete).await?,
            is_edit: has(ChannelPermission::ContentEdit).await?,
            is_arrange: has(ChannelPermission::ContentArrange).await?,
            is_translate: has(ChannelPermission::ContentTranslate).await?,
            is_check: has(ChannelPermission::ContentCheckLevel1).await?,
            is_create: create_contents || has(ChannelPermission::CreatePage).await?,
            is_channel_edit: has(ChannelPermission::ChannelEdit).await?,
        })
    }
}
