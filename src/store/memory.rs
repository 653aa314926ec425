//! store::memory
//!
//! In-memory implementation of every repository trait.
//!
//! # Design
//!
//! The store keeps a [`StoreSnapshot`] behind an `Arc<Mutex<...>>`, so clones
//! share state. It records the operations the engine performs and can be
//! configured to fail specific calls, which makes it suitable both as the
//! CLI's working set (load a snapshot, run, save the snapshot back) and as a
//! deterministic test double.
//!
//! # Example
//!
//! ```
//! use cascadework::core::model::{Channel, Site};
//! use cascadework::core::types::{ChannelId, SiteId};
//! use cascadework::store::memory::MemoryStore;
//! use cascadework::store::snapshot::StoreSnapshot;
//! use cascadework::store::traits::{ChannelRepository, SiteRepository};
//!
//! # tokio_test::block_on(async {
//! let mut snapshot = StoreSnapshot::default();
//! snapshot.sites.push(Site::new(SiteId::new(1), "main"));
//! snapshot.channels.push(Channel {
//!     id: ChannelId::new(1),
//!     site_id: SiteId::new(1),
//!     parent_id: None,
//!     name: "home".into(),
//!     taxis: 0,
//!     list_columns: None,
//! });
//!
//! let store = MemoryStore::from_snapshot(snapshot);
//! let site = store.get_site(SiteId::new(1)).await.unwrap().unwrap();
//! let tree = store.channel_tree(&site, site.root_channel_id).await.unwrap();
//! assert_eq!(tree.len(), 1);
//! # });
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::media::stored_file_name;
use super::snapshot::{NamedSet, StoreSnapshot};
use super::traits::{
    AuditEntry, AuditLog, ChannelRepository, ContentRepository, GroupRepository, LibraryGroup,
    LibraryRepository, LibraryVideo, MediaStore, NewVideo, PublishError, Publisher,
    SiteRepository, StoreError, TagRepository, VideoQuery,
};
use crate::auth::Administrator;
use crate::core::model::{Channel, ChannelSummary, Content, ContentStatus, Site};
use crate::core::types::{AdminId, ChannelId, ContentId, GroupId, LibraryId, SiteId};

/// In-memory store.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    snapshot: StoreSnapshot,
    /// Uploaded media bytes by URL.
    media: HashMap<String, Vec<u8>>,
    /// Contents whose artifact removal fails.
    failing_artifacts: HashSet<ContentId>,
    fail_on: Option<FailOn>,
    operations: Vec<StoreOperation>,
}

/// Which call should fail with a backend error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    GetSite,
    GetChannel,
    ChannelTree,
    CountContent,
    GetContent,
    RecycleContents,
    AddEntry,
    ContentChanged,
    LibraryWrite,
}

/// Recorded operation for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    CountContent {
        channel_id: ChannelId,
    },
    GetContent {
        channel_id: ChannelId,
        content_id: ContentId,
    },
    RecycleContents {
        site_id: SiteId,
        channel_id: ChannelId,
        ids: Vec<ContentId>,
        actor: Option<AdminId>,
        recycled: usize,
    },
    DeleteArtifacts {
        content_id: ContentId,
    },
    ContentChanged {
        site_id: SiteId,
        channel_id: ChannelId,
    },
    AddEntry {
        action: String,
        summary: String,
    },
    PutMedia {
        url: String,
    },
    RemoveMedia {
        url: String,
    },
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                snapshot,
                ..State::default()
            })),
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        Ok(self.state()?.snapshot.clone())
    }

    /// Configure the store to fail a specific call.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        if let Ok(mut state) = self.state() {
            state.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        if let Ok(mut state) = self.state() {
            state.fail_on = None;
        }
    }

    /// Make artifact removal fail for the given contents.
    pub fn fail_artifacts(self, ids: impl IntoIterator<Item = ContentId>) -> Self {
        if let Ok(mut state) = self.state() {
            state.failing_artifacts.extend(ids);
        }
        self
    }

    /// All recorded operations.
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.state()
            .map(|s| s.operations.clone())
            .unwrap_or_default()
    }

    pub fn clear_operations(&self) {
        if let Ok(mut state) = self.state() {
            state.operations.clear();
        }
    }

    /// A content item regardless of status (for verification).
    pub fn content(&self, id: ContentId) -> Option<Content> {
        self.state()
            .ok()
            .and_then(|s| s.snapshot.contents.iter().find(|c| c.id == id).cloned())
    }

    /// Contents that still have generated files.
    pub fn artifacts(&self) -> HashSet<ContentId> {
        self.state()
            .map(|s| s.snapshot.artifacts.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Stored media bytes by URL.
    pub fn media(&self, url: &str) -> Option<Vec<u8>> {
        self.state().ok().and_then(|s| s.media.get(url).cloned())
    }

    /// Find an administrator by user name.
    pub fn administrator(&self, user_name: &str) -> Option<Administrator> {
        self.state()
            .ok()
            .and_then(|s| s.snapshot.administrator(user_name).cloned())
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl State {
    fn check(&self, op: FailOn) -> Result<(), StoreError> {
        if self.fail_on == Some(op) {
            return Err(StoreError::Backend(format!("injected failure on {:?}", op)));
        }
        Ok(())
    }

    fn names(sets: &[NamedSet], site_id: SiteId) -> Vec<String> {
        sets.iter()
            .filter(|s| s.site_id == site_id)
            .flat_map(|s| s.names.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl SiteRepository for MemoryStore {
    async fn get_site(&self, id: SiteId) -> Result<Option<Site>, StoreError> {
        let state = self.state()?;
        state.check(FailOn::GetSite)?;
        Ok(state.snapshot.sites.iter().find(|s| s.id == id).cloned())
    }
}

#[async_trait]
impl ChannelRepository for MemoryStore {
    async fn get_channel(&self, id: ChannelId) -> Result<Option<Channel>, StoreError> {
        let state = self.state()?;
        state.check(FailOn::GetChannel)?;
        Ok(state.snapshot.channels.iter().find(|c| c.id == id).cloned())
    }

    async fn channel_tree(
        &self,
        site: &Site,
        _root: ChannelId,
    ) -> Result<Vec<ChannelSummary>, StoreError> {
        let state = self.state()?;
        state.check(FailOn::ChannelTree)?;
        let mut summaries: Vec<ChannelSummary> = state
            .snapshot
            .channels
            .iter()
            .filter(|c| c.site_id == site.id)
            .map(Channel::summary)
            .collect();
        summaries.sort_by_key(|c| (c.taxis, c.id));
        Ok(summaries)
    }
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn count_content(
        &self,
        site: &Site,
        channel: &ChannelSummary,
    ) -> Result<u64, StoreError> {
        let mut state = self.state()?;
        state.check(FailOn::CountContent)?;
        state.operations.push(StoreOperation::CountContent {
            channel_id: channel.id,
        });
        let count = state
            .snapshot
            .contents
            .iter()
            .filter(|c| c.site_id == site.id && c.channel_id == channel.id && c.is_active())
            .count();
        Ok(count as u64)
    }

    async fn get_content(
        &self,
        site: &Site,
        channel_id: ChannelId,
        id: ContentId,
    ) -> Result<Option<Content>, StoreError> {
        let mut state = self.state()?;
        state.check(FailOn::GetContent)?;
        state.operations.push(StoreOperation::GetContent {
            channel_id,
            content_id: id,
        });
        Ok(state
            .snapshot
            .contents
            .iter()
            .find(|c| {
                c.id == id && c.site_id == site.id && c.channel_id == channel_id && c.is_active()
            })
            .cloned())
    }

    async fn recycle_contents(
        &self,
        site: &Site,
        channel_id: ChannelId,
        ids: &[ContentId],
        actor: Option<AdminId>,
    ) -> Result<usize, StoreError> {
        let mut state = self.state()?;
        state.check(FailOn::RecycleContents)?;

        let now = Utc::now();
        let mut recycled = 0;
        for content in state.snapshot.contents.iter_mut().filter(|c| {
            ids.contains(&c.id) && c.site_id == site.id && c.channel_id == channel_id
        }) {
            if content.status == ContentStatus::Recycled {
                continue;
            }
            content.status = ContentStatus::Recycled;
            content.recycled_by = actor;
            content.last_edit_date = now;
            recycled += 1;
        }

        state.operations.push(StoreOperation::RecycleContents {
            site_id: site.id,
            channel_id,
            ids: ids.to_vec(),
            actor,
            recycled,
        });
        Ok(recycled)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn group_names(&self, site_id: SiteId) -> Result<Vec<String>, StoreError> {
        let state = self.state()?;
        Ok(State::names(&state.snapshot.content_groups, site_id))
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn tag_names(&self, site_id: SiteId) -> Result<Vec<String>, StoreError> {
        let state = self.state()?;
        Ok(State::names(&state.snapshot.content_tags, site_id))
    }
}

#[async_trait]
impl Publisher for MemoryStore {
    async fn delete_content_artifacts(
        &self,
        _site: &Site,
        _channel_id: ChannelId,
        content_id: ContentId,
    ) -> Result<(), PublishError> {
        let mut state = self.state().map_err(|e| PublishError::ArtifactRemoval {
            content_id,
            message: e.to_string(),
        })?;
        state
            .operations
            .push(StoreOperation::DeleteArtifacts { content_id });
        if state.failing_artifacts.contains(&content_id) {
            return Err(PublishError::ArtifactRemoval {
                content_id,
                message: "file is in use".into(),
            });
        }
        state.snapshot.artifacts.remove(&content_id);
        Ok(())
    }

    async fn content_changed(
        &self,
        site_id: SiteId,
        channel_id: ChannelId,
    ) -> Result<(), StoreError> {
        let mut state = self.state()?;
        state.check(FailOn::ContentChanged)?;
        state.operations.push(StoreOperation::ContentChanged {
            site_id,
            channel_id,
        });
        Ok(())
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn add_entry(&self, entry: AuditEntry) -> Result<(), StoreError> {
        let mut state = self.state()?;
        state.check(FailOn::AddEntry)?;
        state.operations.push(StoreOperation::AddEntry {
            action: entry.action.clone(),
            summary: entry.summary.clone(),
        });
        state.snapshot.audit.push(entry);
        Ok(())
    }

    async fn entries(&self, site_id: SiteId) -> Result<Vec<AuditEntry>, StoreError> {
        let state = self.state()?;
        Ok(state
            .snapshot
            .audit
            .iter()
            .filter(|e| e.site_id == site_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LibraryRepository for MemoryStore {
    async fn groups(&self, site_id: SiteId) -> Result<Vec<LibraryGroup>, StoreError> {
        let state = self.state()?;
        Ok(state
            .snapshot
            .library_groups
            .iter()
            .filter(|g| g.site_id == site_id)
            .cloned()
            .collect())
    }

    async fn get_group(
        &self,
        site_id: SiteId,
        id: GroupId,
    ) -> Result<Option<LibraryGroup>, StoreError> {
        let state = self.state()?;
        Ok(state
            .snapshot
            .library_groups
            .iter()
            .find(|g| g.site_id == site_id && g.id == id)
            .cloned())
    }

    async fn insert_group(&self, site_id: SiteId, name: &str) -> Result<LibraryGroup, StoreError> {
        let mut state = self.state()?;
        state.check(FailOn::LibraryWrite)?;
        let next = state
            .snapshot
            .library_groups
            .iter()
            .map(|g| g.id.get())
            .max()
            .unwrap_or(0)
            + 1;
        let group = LibraryGroup {
            id: GroupId::new(next),
            site_id,
            name: name.to_string(),
        };
        state.snapshot.library_groups.push(group.clone());
        Ok(group)
    }

    async fn update_group(&self, group: &LibraryGroup) -> Result<(), StoreError> {
        let mut state = self.state()?;
        state.check(FailOn::LibraryWrite)?;
        if let Some(existing) = state
            .snapshot
            .library_groups
            .iter_mut()
            .find(|g| g.site_id == group.site_id && g.id == group.id)
        {
            *existing = group.clone();
        }
        Ok(())
    }

    async fn delete_group(&self, site_id: SiteId, id: GroupId) -> Result<bool, StoreError> {
        let mut state = self.state()?;
        state.check(FailOn::LibraryWrite)?;
        let before = state.snapshot.library_groups.len();
        state
            .snapshot
            .library_groups
            .retain(|g| !(g.site_id == site_id && g.id == id));
        let removed = state.snapshot.library_groups.len() != before;
        if removed {
            for video in state
                .snapshot
                .library_videos
                .iter_mut()
                .filter(|v| v.site_id == site_id && v.group_id == id)
            {
                video.group_id = GroupId::NONE;
            }
        }
        Ok(removed)
    }

    async fn videos(
        &self,
        site_id: SiteId,
        query: &VideoQuery,
    ) -> Result<(u64, Vec<LibraryVideo>), StoreError> {
        let state = self.state()?;
        let keyword = query
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase);

        let mut matching: Vec<&LibraryVideo> = state
            .snapshot
            .library_videos
            .iter()
            .filter(|v| v.site_id == site_id)
            .filter(|v| query.group_id.is_none() || v.group_id == query.group_id)
            .filter(|v| match &keyword {
                Some(k) => v.title.to_lowercase().contains(k),
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));

        let count = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect();
        Ok((count, items))
    }

    async fn get_video(
        &self,
        site_id: SiteId,
        id: LibraryId,
    ) -> Result<Option<LibraryVideo>, StoreError> {
        let state = self.state()?;
        Ok(state
            .snapshot
            .library_videos
            .iter()
            .find(|v| v.site_id == site_id && v.id == id)
            .cloned())
    }

    async fn insert_video(&self, video: NewVideo) -> Result<LibraryVideo, StoreError> {
        let mut state = self.state()?;
        state.check(FailOn::LibraryWrite)?;
        let next = state
            .snapshot
            .library_videos
            .iter()
            .map(|v| v.id.get())
            .max()
            .unwrap_or(0)
            + 1;
        let video = LibraryVideo {
            id: LibraryId::new(next),
            site_id: video.site_id,
            group_id: video.group_id,
            title: video.title,
            file_type: video.file_type,
            url: video.url,
            created_at: Utc::now(),
        };
        state.snapshot.library_videos.push(video.clone());
        Ok(video)
    }

    async fn update_video(&self, video: &LibraryVideo) -> Result<(), StoreError> {
        let mut state = self.state()?;
        state.check(FailOn::LibraryWrite)?;
        if let Some(existing) = state
            .snapshot
            .library_videos
            .iter_mut()
            .find(|v| v.site_id == video.site_id && v.id == video.id)
        {
            *existing = video.clone();
        }
        Ok(())
    }

    async fn delete_video(&self, site_id: SiteId, id: LibraryId) -> Result<bool, StoreError> {
        let mut state = self.state()?;
        state.check(FailOn::LibraryWrite)?;
        let before = state.snapshot.library_videos.len();
        state
            .snapshot
            .library_videos
            .retain(|v| !(v.site_id == site_id && v.id == id));
        Ok(state.snapshot.library_videos.len() != before)
    }
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn put(
        &self,
        site_id: SiteId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        let mut state = self.state()?;
        let url = format!("/{}/upload/videos/{}", site_id, stored_file_name(file_name));
        state.media.insert(url.clone(), bytes.to_vec());
        state
            .operations
            .push(StoreOperation::PutMedia { url: url.clone() });
        Ok(url)
    }

    async fn remove(&self, url: &str) -> Result<(), StoreError> {
        let mut state = self.state()?;
        state.media.remove(url);
        state.operations.push(StoreOperation::RemoveMedia {
            url: url.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryStore {
        let mut snapshot = StoreSnapshot::default();
        snapshot.sites.push(Site::new(SiteId::new(1), "main"));
        for (id, parent, name, taxis) in [
            (1, None, "home", 0),
            (2, Some(1), "news", 2),
            (3, Some(1), "notices", 1),
            (4, Some(2), "local", 1),
        ] {
            snapshot.channels.push(Channel {
                id: ChannelId::new(id),
                site_id: SiteId::new(1),
                parent_id: parent.map(ChannelId::new),
                name: name.into(),
                taxis,
                list_columns: None,
            });
        }
        for id in [101, 102] {
            snapshot.contents.push(Content::new(
                ContentId::new(id),
                SiteId::new(1),
                ChannelId::new(2),
                format!("item {}", id),
            ));
        }
        MemoryStore::from_snapshot(snapshot)
    }

    async fn site(store: &MemoryStore) -> Site {
        store.get_site(SiteId::new(1)).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn channel_tree_is_in_display_order() {
        let store = seeded();
        let site = site(&store).await;
        let ids: Vec<u32> = store
            .channel_tree(&site, site.root_channel_id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id.get())
            .collect();
        assert_eq!(ids, vec![1, 3, 4, 2]);
    }

    #[tokio::test]
    async fn navigation_skips_site_root() {
        let store = seeded();
        let site = site(&store).await;
        assert_eq!(
            store
                .channel_name_navigation(&site, ChannelId::new(4))
                .await
                .unwrap(),
            "news > local"
        );
        assert_eq!(
            store
                .channel_name_navigation(&site, ChannelId::new(1))
                .await
                .unwrap(),
            "home"
        );
    }

    #[tokio::test]
    async fn recycle_is_idempotent() {
        let store = seeded();
        let site = site(&store).await;
        let ids = [ContentId::new(101), ContentId::new(999)];

        let first = store
            .recycle_contents(&site, ChannelId::new(2), &ids, Some(AdminId::new(1)))
            .await
            .unwrap();
        let second = store
            .recycle_contents(&site, ChannelId::new(2), &ids, Some(AdminId::new(1)))
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 0);
        let recycled = store.content(ContentId::new(101)).unwrap();
        assert_eq!(recycled.status, ContentStatus::Recycled);
        assert_eq!(recycled.recycled_by, Some(AdminId::new(1)));
        assert!(store
            .get_content(&site, ChannelId::new(2), ContentId::new(101))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn recycle_ignores_other_channels() {
        let store = seeded();
        let site = site(&store).await;
        let recycled = store
            .recycle_contents(&site, ChannelId::new(3), &[ContentId::new(101)], None)
            .await
            .unwrap();
        assert_eq!(recycled, 0);
        assert!(store.content(ContentId::new(101)).unwrap().is_active());
    }

    #[tokio::test]
    async fn fail_on_injects_backend_error() {
        let store = seeded().fail_on(FailOn::GetSite);
        assert!(matches!(
            store.get_site(SiteId::new(1)).await,
            Err(StoreError::Backend(_))
        ));
        store.clear_fail_on();
        assert!(store.get_site(SiteId::new(1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn failing_artifacts_report_publish_error() {
        let store = seeded().fail_artifacts([ContentId::new(102)]);
        let site = site(&store).await;
        assert!(store
            .delete_content_artifacts(&site, ChannelId::new(2), ContentId::new(101))
            .await
            .is_ok());
        assert!(matches!(
            store
                .delete_content_artifacts(&site, ChannelId::new(2), ContentId::new(102))
                .await,
            Err(PublishError::ArtifactRemoval { .. })
        ));
    }

    #[tokio::test]
    async fn deleting_group_ungroups_videos() {
        let store = seeded();
        let site_id = SiteId::new(1);
        let group = store.insert_group(site_id, "clips").await.unwrap();
        let video = store
            .insert_video(NewVideo {
                site_id,
                group_id: group.id,
                title: "intro".into(),
                file_type: "mp4".into(),
                url: "/1/upload/videos/a.mp4".into(),
            })
            .await
            .unwrap();

        assert!(store.delete_group(site_id, group.id).await.unwrap());
        let moved = store.get_video(site_id, video.id).await.unwrap().unwrap();
        assert!(moved.group_id.is_none());
    }
}
