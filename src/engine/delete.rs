//! engine::delete
//!
//! Content deletion pipeline.
//!
//! # Stages
//!
//! ```text
//! Validated -> PhysicalCleanup (unless retaining files) -> Recycled -> Logged -> NotificationSent -> Done
//! ```
//!
//! - **Validated**: gate, non-empty id list (duplicates dropped), site and
//!   channel resolve and belong together. Nothing is changed before this.
//! - **PhysicalCleanup**: generated files are removed per item. Failures are
//!   logged and counted; under [`CleanupPolicy::Strict`] any failure aborts
//!   the batch before recycling.
//! - **Recycled**: one repository call recycles the whole batch, stamped with
//!   the caller's admin id. This is the point of no return.
//! - **Logged**: exactly one audit entry per batch.
//! - **NotificationSent**: one change notification per batch.
//!
//! # Cancellation
//!
//! Cancellation is honoured up to and including the recycle call. Once
//! recycling has committed, logging and notification always run.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn, Instrument};

use super::cancel::cancellable;
use super::gate::require_channel;
use super::{Caller, Engine, EngineError};
use crate::auth::ChannelPermission;
use crate::core::check::CheckState;
use crate::core::config::CleanupPolicy;
use crate::core::model::{Channel, Site};
use crate::core::types::{ChannelId, ContentId, SiteId};
use crate::store::traits::{AuditEntry, StoreError};

/// Audit action of a single-item delete.
pub const ACTION_DELETE: &str = "删除内容";

/// Audit action of a multi-item delete.
pub const ACTION_BATCH_DELETE: &str = "批量删除内容";

/// Field added to each confirmation entry.
pub const CHECK_STATE_FIELD: &str = "checkState";

/// Request for the confirmation payload shown before deleting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConfirmRequest {
    pub site_id: SiteId,
    pub channel_id: ChannelId,
    pub content_ids: Vec<ContentId>,
}

/// Request to delete (recycle) contents of a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSubmitRequest {
    pub site_id: SiteId,
    pub channel_id: ChannelId,
    pub content_ids: Vec<ContentId>,
    /// Keep generated files instead of removing them.
    #[serde(default)]
    pub is_retain_files: bool,
}

/// Result of a delete batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub value: bool,
    /// Items whose generated files could not be removed.
    pub cleanup_failures: usize,
}

/// Pipeline stage, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStage {
    Validated,
    PhysicalCleanup,
    Recycled,
    Logged,
    NotificationSent,
    Done,
}

impl fmt::Display for DeleteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeleteStage::Validated => "validated",
            DeleteStage::PhysicalCleanup => "physical_cleanup",
            DeleteStage::Recycled => "recycled",
            DeleteStage::Logged => "logged",
            DeleteStage::NotificationSent => "notification_sent",
            DeleteStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Drop repeated ids, keeping the first occurrence.
fn dedup(ids: &[ContentId]) -> Vec<ContentId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Audit entry for a recycled batch.
///
/// `title` is the freshly looked-up title of a single-item batch.
fn audit_entry(
    site: &Site,
    channel: &Channel,
    navigation: &str,
    ids: &[ContentId],
    title: Option<&str>,
) -> AuditEntry {
    match ids {
        [id] => {
            let summary = match title {
                Some(title) => format!("栏目:{},内容标题:{}", navigation, title),
                None => format!("栏目:{},内容ID:{}", navigation, id),
            };
            AuditEntry::new(site.id, ACTION_DELETE, summary)
                .with_channel(channel.id)
                .with_content(*id)
        }
        _ => AuditEntry::new(
            site.id,
            ACTION_BATCH_DELETE,
            format!("栏目:{},内容条数:{}", navigation, ids.len()),
        ),
    }
}

impl Engine {
    /// Resolve the site and channel of a delete request.
    async fn resolve_channel(
        &self,
        caller: &Caller,
        site_id: SiteId,
        channel_id: ChannelId,
    ) -> Result<(Site, Channel), EngineError> {
        let site = cancellable(&caller.cancel, self.services.sites.get_site(site_id))
            .await??
            .ok_or_else(|| EngineError::NotFound(format!("site {}", site_id)))?;
        let channel = cancellable(&caller.cancel, self.services.channels.get_channel(channel_id))
            .await??
            .filter(|c| c.site_id == site.id)
            .ok_or_else(|| EngineError::NotFound(format!("channel {}", channel_id)))?;
        Ok((site, channel))
    }

    /// Field maps of the contents about to be deleted, in request order.
    ///
    /// One map per requested id, repeats included. Ids that do not resolve to
    /// an active content of the channel are skipped. Each map carries a
    /// computed `checkState` label.
    ///
    /// Requires the `cms_contentDelete` channel permission.
    pub async fn delete_confirmation(
        &self,
        caller: &Caller,
        request: &DeleteConfirmRequest,
    ) -> Result<Vec<Map<String, Value>>, EngineError> {
        require_channel(
            self.services.oracle.as_ref(),
            &caller.principal,
            request.site_id,
            request.channel_id,
            ChannelPermission::ContentDelete,
        )
        .await?;

        let (site, channel) = self
            .resolve_channel(caller, request.site_id, request.channel_id)
            .await?;

        let mut entries = Vec::new();
        for &id in &request.content_ids {
            let content = cancellable(
                &caller.cancel,
                self.services.contents.get_content(&site, channel.id, id),
            )
            .await??;
            let Some(content) = content else {
                debug!(content_id = %id, "confirmation: skipping unresolved content");
                continue;
            };

            let mut fields = content.to_fields().map_err(StoreError::from)?;
            fields.insert(
                CHECK_STATE_FIELD.to_string(),
                Value::from(CheckState::of(&site, &content).label()),
            );
            entries.push(fields);
        }
        Ok(entries)
    }

    /// Delete (recycle) contents of a channel.
    ///
    /// Requires the `cms_contentDelete` channel permission.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` / `Unauthorized` from the gate
    /// - `ValidationFailed` for an empty id list
    /// - `NotFound` if the site or channel does not resolve
    /// - `PartialCleanupFailure` under the strict cleanup policy
    /// - `Cancelled` if the caller cancels before recycling starts
    /// - `Store` if a repository call fails; a failure before recycling
    ///   leaves everything untouched, a failure while logging or notifying is
    ///   reported after both have been attempted
    pub async fn delete_contents(
        &self,
        caller: &Caller,
        request: &DeleteSubmitRequest,
    ) -> Result<DeleteOutcome, EngineError> {
        let span = tracing::info_span!(
            "delete_contents",
            site_id = %request.site_id,
            channel_id = %request.channel_id,
            batch = request.content_ids.len(),
        );
        self.run_delete(caller, request).instrument(span).await
    }

    async fn run_delete(
        &self,
        caller: &Caller,
        request: &DeleteSubmitRequest,
    ) -> Result<DeleteOutcome, EngineError> {
        require_channel(
            self.services.oracle.as_ref(),
            &caller.principal,
            request.site_id,
            request.channel_id,
            ChannelPermission::ContentDelete,
        )
        .await?;

        let ids = dedup(&request.content_ids);
        if ids.is_empty() {
            return Err(EngineError::ValidationFailed(
                "no content ids given".to_string(),
            ));
        }

        let (site, channel) = self
            .resolve_channel(caller, request.site_id, request.channel_id)
            .await?;
        debug!(stage = %DeleteStage::Validated, items = ids.len());

        let mut failed = Vec::new();
        if !request.is_retain_files {
            for &id in &ids {
                let removed = cancellable(
                    &caller.cancel,
                    self.services
                        .publisher
                        .delete_content_artifacts(&site, channel.id, id),
                )
                .await?;
                if let Err(e) = removed {
                    warn!(content_id = %id, error = %e, "failed to remove generated files");
                    failed.push(id);
                }
            }
            debug!(
                stage = %DeleteStage::PhysicalCleanup,
                failed = failed.len(),
                policy = %self.settings.cleanup_policy
            );
            if !failed.is_empty() && self.settings.cleanup_policy == CleanupPolicy::Strict {
                return Err(EngineError::PartialCleanupFailure { failed });
            }
        }

        let title = match ids.as_slice() {
            [id] => cancellable(
                &caller.cancel,
                self.services.contents.get_content(&site, channel.id, *id),
            )
            .await??
            .map(|content| content.title),
            _ => None,
        };
        let navigation = cancellable(
            &caller.cancel,
            self.services
                .channels
                .channel_name_navigation(&site, channel.id),
        )
        .await??;

        // Last cancellation point. Once the recycle call starts it runs to
        // completion, and logging and notification follow it.
        if caller.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let actor = caller.principal.admin_id();
        let recycled = self
            .services
            .contents
            .recycle_contents(&site, channel.id, &ids, actor)
            .await?;
        info!(stage = %DeleteStage::Recycled, recycled, requested = ids.len());

        let entry = audit_entry(&site, &channel, &navigation, &ids, title.as_deref())
            .with_admin(actor);
        let logged = self.services.audit.add_entry(entry).await;
        match &logged {
            Ok(()) => debug!(stage = %DeleteStage::Logged),
            Err(e) => error!(error = %e, "failed to write audit entry after recycling"),
        }

        let notified = self
            .services
            .publisher
            .content_changed(site.id, channel.id)
            .await;
        match &notified {
            Ok(()) => debug!(stage = %DeleteStage::NotificationSent),
            Err(e) => error!(error = %e, "failed to send change notification after recycling"),
        }

        logged?;
        notified?;
        debug!(stage = %DeleteStage::Done);

        Ok(DeleteOutcome {
            value: true,
            cleanup_failures: failed.len(),
        })
    }
}
