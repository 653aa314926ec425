//! store::traits
//!
//! Repository traits consumed by the engine.
//!
//! # Design
//!
//! Every repository call is async because backends perform I/O. All methods
//! return `Result` so backend failures surface as [`StoreError`]; absence is
//! `Ok(None)`, never an error.
//!
//! The traits are split by concern so an integration can back each one with a
//! different service. [`crate::store::memory::MemoryStore`] implements all of
//! them.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::model::{Channel, ChannelSummary, Content, Site};
use crate::core::types::{AdminId, ChannelId, ContentId, GroupId, LibraryId, SiteId};

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The store file lock could not be taken.
    #[error("store lock error: {0}")]
    Lock(String),

    /// A previous writer panicked while holding the store.
    #[error("store state poisoned")]
    Poisoned,
}

/// Errors from physical artifact cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("failed to remove generated files of content {content_id}: {message}")]
    ArtifactRemoval { content_id: ContentId, message: String },
}

/// Site lookups.
#[async_trait]
pub trait SiteRepository: Send + Sync {
    async fn get_site(&self, id: SiteId) -> Result<Option<Site>, StoreError>;

    /// Public URL of the site, without a trailing slash.
    async fn site_url(&self, site: &Site) -> Result<String, StoreError> {
        Ok(site.url.trim_end_matches('/').to_string())
    }
}

/// Channel lookups.
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    async fn get_channel(&self, id: ChannelId) -> Result<Option<Channel>, StoreError>;

    /// Summaries of the channels under `root` (inclusive), in stored display
    /// order. Implementations may return more of the site's channels; callers
    /// keep only those reachable from `root`.
    async fn channel_tree(
        &self,
        site: &Site,
        root: ChannelId,
    ) -> Result<Vec<ChannelSummary>, StoreError>;

    /// Full navigational name of a channel: ancestor names below the site
    /// root joined by `" > "`. The root channel itself yields its own name.
    async fn channel_name_navigation(
        &self,
        site: &Site,
        channel_id: ChannelId,
    ) -> Result<String, StoreError> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(channel_id);

        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            let Some(channel) = self.get_channel(id).await? else {
                break;
            };
            if channel.site_id != site.id {
                break;
            }
            if channel.is_root() && !names.is_empty() {
                break;
            }
            names.push(channel.name);
            current = channel.parent_id;
        }

        names.reverse();
        Ok(names.join(" > "))
    }
}

/// Content lookups and state changes.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Number of active contents directly in a channel.
    async fn count_content(&self, site: &Site, channel: &ChannelSummary)
        -> Result<u64, StoreError>;

    /// An active content item of the given channel.
    async fn get_content(
        &self,
        site: &Site,
        channel_id: ChannelId,
        id: ContentId,
    ) -> Result<Option<Content>, StoreError>;

    /// Move contents of a channel to the recycle bin in one operation.
    ///
    /// Ids that are already recycled, missing or belong to another channel
    /// are skipped. Returns the number of items actually recycled.
    async fn recycle_contents(
        &self,
        site: &Site,
        channel_id: ChannelId,
        ids: &[ContentId],
        actor: Option<AdminId>,
    ) -> Result<usize, StoreError>;
}

/// Content group names.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn group_names(&self, site_id: SiteId) -> Result<Vec<String>, StoreError>;
}

/// Content tag names.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn tag_names(&self, site_id: SiteId) -> Result<Vec<String>, StoreError>;
}

/// Generated-file management and change notification.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Remove the generated files of one content item.
    async fn delete_content_artifacts(
        &self,
        site: &Site,
        channel_id: ChannelId,
        content_id: ContentId,
    ) -> Result<(), PublishError>;

    /// Signal that contents of a channel changed.
    async fn content_changed(&self, site_id: SiteId, channel_id: ChannelId)
        -> Result<(), StoreError>;
}

/// An administrator action log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub site_id: SiteId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<ContentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<AdminId>,
    pub action: String,
    pub summary: String,
    pub added_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(site_id: SiteId, action: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            site_id,
            channel_id: None,
            content_id: None,
            admin_id: None,
            action: action.into(),
            summary: summary.into(),
            added_at: Utc::now(),
        }
    }

    pub fn with_channel(mut self, channel_id: ChannelId) -> Self {
        self.channel_id = Some(channel_id);
        self
    }

    pub fn with_content(mut self, content_id: ContentId) -> Self {
        self.content_id = Some(content_id);
        self
    }

    pub fn with_admin(mut self, admin_id: Option<AdminId>) -> Self {
        self.admin_id = admin_id;
        self
    }
}

/// Administrator action log.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn add_entry(&self, entry: AuditEntry) -> Result<(), StoreError>;

    /// Entries of a site, oldest first.
    async fn entries(&self, site_id: SiteId) -> Result<Vec<AuditEntry>, StoreError>;
}

/// A media library group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryGroup {
    pub id: GroupId,
    pub site_id: SiteId,
    pub name: String,
}

/// A media library video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryVideo {
    pub id: LibraryId,
    pub site_id: SiteId,
    pub group_id: GroupId,
    pub title: String,
    /// Lower-case file extension, e.g. `mp4`.
    pub file_type: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// A video about to be inserted (id assigned by the repository).
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub site_id: SiteId,
    pub group_id: GroupId,
    pub title: String,
    pub file_type: String,
    pub url: String,
}

/// Filter and window for video queries.
#[derive(Debug, Clone, Default)]
pub struct VideoQuery {
    /// Case-insensitive title substring.
    pub keyword: Option<String>,
    /// `GroupId::NONE` matches every group.
    pub group_id: GroupId,
    pub offset: usize,
    pub limit: usize,
}

/// Media library records.
#[async_trait]
pub trait LibraryRepository: Send + Sync {
    async fn groups(&self, site_id: SiteId) -> Result<Vec<LibraryGroup>, StoreError>;

    async fn get_group(
        &self,
        site_id: SiteId,
        id: GroupId,
    ) -> Result<Option<LibraryGroup>, StoreError>;

    async fn insert_group(&self, site_id: SiteId, name: &str)
        -> Result<LibraryGroup, StoreError>;

    async fn update_group(&self, group: &LibraryGroup) -> Result<(), StoreError>;

    /// Delete a group; its videos move to `GroupId::NONE`.
    async fn delete_group(&self, site_id: SiteId, id: GroupId) -> Result<bool, StoreError>;

    /// Total matching count and the requested window, newest first.
    async fn videos(
        &self,
        site_id: SiteId,
        query: &VideoQuery,
    ) -> Result<(u64, Vec<LibraryVideo>), StoreError>;

    async fn get_video(
        &self,
        site_id: SiteId,
        id: LibraryId,
    ) -> Result<Option<LibraryVideo>, StoreError>;

    async fn insert_video(&self, video: NewVideo) -> Result<LibraryVideo, StoreError>;

    async fn update_video(&self, video: &LibraryVideo) -> Result<(), StoreError>;

    async fn delete_video(&self, site_id: SiteId, id: LibraryId) -> Result<bool, StoreError>;
}

/// Storage of uploaded media bytes.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store bytes under a file name and return the public URL.
    async fn put(&self, site_id: SiteId, file_name: &str, bytes: &[u8])
        -> Result<String, StoreError>;

    /// Remove previously stored media by URL. Missing media is not an error.
    async fn remove(&self, url: &str) -> Result<(), StoreError>;
}
