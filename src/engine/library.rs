//! engine::library
//!
//! Video media library: paged queries, uploads, edits and groups.
//!
//! Every operation requires the `cms_library` site permission and an existing
//! site. Records live in a [`LibraryRepository`](crate::store::traits::LibraryRepository);
//! uploaded bytes go to a [`MediaStore`](crate::store::traits::MediaStore).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::cancel::cancellable;
use super::gate::require_site;
use super::{Caller, Engine, EngineError};
use crate::auth::SitePermission;
use crate::core::model::Site;
use crate::core::types::{GroupId, LibraryId, SiteId};
use crate::store::traits::{LibraryGroup, LibraryVideo, NewVideo, VideoQuery};

/// File extensions accepted as videos.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "flv", "webm", "ogg", "ogv", "mov", "avi", "wmv", "mkv", "m4v",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub site_id: SiteId,
    #[serde(default)]
    pub keyword: Option<String>,
    /// `0` matches every group.
    #[serde(default)]
    pub group_id: GroupId,
    /// 1-based page number; `0` is treated as the first page.
    #[serde(default)]
    pub page: usize,
    /// `0` uses the configured page size.
    #[serde(default)]
    pub per_page: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub groups: Vec<LibraryGroup>,
    /// Number of matching videos across all pages.
    pub count: u64,
    pub items: Vec<LibraryVideo>,
}

/// An upload.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub site_id: SiteId,
    pub group_id: GroupId,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub site_id: SiteId,
    pub id: LibraryId,
    pub title: String,
    #[serde(default)]
    pub group_id: GroupId,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub site_id: SiteId,
    pub id: LibraryId,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub site_id: SiteId,
    pub library_id: LibraryId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    pub site_id: SiteId,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRenameRequest {
    pub site_id: SiteId,
    pub id: GroupId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDeleteRequest {
    pub site_id: SiteId,
    pub id: GroupId,
}

/// Split an upload name into `(title, file_type)`.
///
/// The title is the file stem; the type is the lower-cased extension, which
/// must be one of [`VIDEO_EXTENSIONS`].
pub fn video_file_parts(file_name: &str) -> Result<(String, String), EngineError> {
    let path = Path::new(file_name);
    let file_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            EngineError::ValidationFailed(format!("'{}' is not a video file", file_name))
        })?;
    let title = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| EngineError::ValidationFailed(format!("'{}' has no name", file_name)))?;
    Ok((title.to_string(), file_type))
}

fn group_name(name: &str) -> Result<String, EngineError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::ValidationFailed(
            "group name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

impl Engine {
    async fn library_site(&self, caller: &Caller, site_id: SiteId) -> Result<Site, EngineError> {
        require_site(
            self.services.oracle.as_ref(),
            &caller.principal,
            site_id,
            SitePermission::Library,
        )
        .await?;
        cancellable(&caller.cancel, self.services.sites.get_site(site_id))
            .await??
            .ok_or_else(|| EngineError::NotFound(format!("site {}", site_id)))
    }

    /// The group must exist unless it is `GroupId::NONE`.
    async fn require_group(
        &self,
        caller: &Caller,
        site_id: SiteId,
        group_id: GroupId,
    ) -> Result<(), EngineError> {
        if group_id.is_none() {
            return Ok(());
        }
        cancellable(
            &caller.cancel,
            self.services.library.get_group(site_id, group_id),
        )
        .await??
        .map(|_| ())
        .ok_or_else(|| EngineError::NotFound(format!("library group {}", group_id)))
    }

    async fn require_unique_group_name(
        &self,
        caller: &Caller,
        site_id: SiteId,
        name: &str,
        except: Option<GroupId>,
    ) -> Result<(), EngineError> {
        let groups = cancellable(&caller.cancel, self.services.library.groups(site_id)).await??;
        if groups
            .iter()
            .any(|g| g.name == name && Some(g.id) != except)
        {
            return Err(EngineError::ValidationFailed(format!(
                "library group '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    async fn video(
        &self,
        caller: &Caller,
        site_id: SiteId,
        id: LibraryId,
    ) -> Result<LibraryVideo, EngineError> {
        cancellable(&caller.cancel, self.services.library.get_video(site_id, id))
            .await??
            .ok_or_else(|| EngineError::NotFound(format!("library item {}", id)))
    }

    /// One page of videos plus the site's groups.
    pub async fn library_query(
        &self,
        caller: &Caller,
        request: &QueryRequest,
    ) -> Result<QueryResult, EngineError> {
        let site = self.library_site(caller, request.site_id).await?;

        let per_page = match request.per_page {
            0 => self.settings.library_page_size,
            n => n,
        };
        let page = request.page.max(1);
        let query = VideoQuery {
            keyword: request.keyword.clone(),
            group_id: request.group_id,
            offset: (page - 1).saturating_mul(per_page),
            limit: per_page,
        };

        let groups = cancellable(&caller.cancel, self.services.library.groups(site.id)).await??;
        let (count, items) =
            cancellable(&caller.cancel, self.services.library.videos(site.id, &query)).await??;

        Ok(QueryResult {
            groups,
            count,
            items,
        })
    }

    /// Store an uploaded video and record it.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for an empty upload or a non-video file name
    /// - `NotFound` if the target group does not exist
    /// - `Cancelled` if the caller cancels before the upload starts
    pub async fn library_create(
        &self,
        caller: &Caller,
        request: &CreateRequest,
    ) -> Result<LibraryVideo, EngineError> {
        let site = self.library_site(caller, request.site_id).await?;

        if request.bytes.is_empty() {
            return Err(EngineError::ValidationFailed(format!(
                "'{}' is empty",
                request.file_name
            )));
        }
        let (title, file_type) = video_file_parts(&request.file_name)?;
        self.require_group(caller, site.id, request.group_id).await?;

        // The upload and the record insert run uninterrupted once started.
        if caller.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let url = self
            .services
            .media
            .put(site.id, &request.file_name, &request.bytes)
            .await?;

        let inserted = self
            .services
            .library
            .insert_video(NewVideo {
                site_id: site.id,
                group_id: request.group_id,
                title,
                file_type,
                url: url.clone(),
            })
            .await;
        let video = match inserted {
            Ok(video) => video,
            Err(e) => {
                if let Err(remove) = self.services.media.remove(&url).await {
                    warn!(%url, error = %remove, "failed to remove orphaned upload");
                }
                return Err(e.into());
            }
        };

        info!(site_id = %site.id, library_id = %video.id, bytes = request.bytes.len(), "library upload");
        Ok(video)
    }

    /// Change a video's title and group.
    pub async fn library_update(
        &self,
        caller: &Caller,
        request: &UpdateRequest,
    ) -> Result<LibraryVideo, EngineError> {
        let site = self.library_site(caller, request.site_id).await?;

        let title = request.title.trim();
        if title.is_empty() {
            return Err(EngineError::ValidationFailed(
                "title must not be empty".to_string(),
            ));
        }
        let mut video = self.video(caller, site.id, request.id).await?;
        self.require_group(caller, site.id, request.group_id).await?;

        video.title = title.to_string();
        video.group_id = request.group_id;
        cancellable(&caller.cancel, self.services.library.update_video(&video)).await??;
        Ok(video)
    }

    /// Delete a video record and its stored media.
    ///
    /// The record goes first; a media removal failure afterwards is logged
    /// and leaves orphaned bytes behind.
    pub async fn library_delete(
        &self,
        caller: &Caller,
        request: &DeleteRequest,
    ) -> Result<(), EngineError> {
        let site = self.library_site(caller, request.site_id).await?;
        let video = self.video(caller, site.id, request.id).await?;

        let deleted = cancellable(
            &caller.cancel,
            self.services.library.delete_video(site.id, video.id),
        )
        .await??;
        if !deleted {
            return Err(EngineError::NotFound(format!("library item {}", video.id)));
        }

        if let Err(e) = self.services.media.remove(&video.url).await {
            warn!(url = %video.url, error = %e, "failed to remove library media");
        }
        info!(site_id = %site.id, library_id = %video.id, "library delete");
        Ok(())
    }

    /// Stored URL of a video.
    pub async fn library_download(
        &self,
        caller: &Caller,
        request: &DownloadRequest,
    ) -> Result<String, EngineError> {
        let site = self.library_site(caller, request.site_id).await?;
        Ok(self.video(caller, site.id, request.library_id).await?.url)
    }

    pub async fn library_add_group(
        &self,
        caller: &Caller,
        request: &GroupRequest,
    ) -> Result<LibraryGroup, EngineError> {
        let site = self.library_site(caller, request.site_id).await?;
        let name = group_name(&request.name)?;
        self.require_unique_group_name(caller, site.id, &name, None)
            .await?;

        let group = cancellable(
            &caller.cancel,
            self.services.library.insert_group(site.id, &name),
        )
        .await??;
        Ok(group)
    }

    pub async fn library_rename_group(
        &self,
        caller: &Caller,
        request: &GroupRenameRequest,
    ) -> Result<LibraryGroup, EngineError> {
        let site = self.library_site(caller, request.site_id).await?;
        let name = group_name(&request.name)?;

        let mut group = cancellable(
            &caller.cancel,
            self.services.library.get_group(site.id, request.id),
        )
        .await??
        .ok_or_else(|| EngineError::NotFound(format!("library group {}", request.id)))?;
        self.require_unique_group_name(caller, site.id, &name, Some(group.id))
            .await?;

        group.name = name;
        cancellable(&caller.cancel, self.services.library.update_group(&group)).await??;
        Ok(group)
    }

    /// Delete a group; its videos become ungrouped.
    pub async fn library_delete_group(
        &self,
        caller: &Caller,
        request: &GroupDeleteRequest,
    ) -> Result<(), EngineError> {
        let site = self.library_site(caller, request.site_id).await?;
        let deleted = cancellable(
            &caller.cancel,
            self.services.library.delete_group(site.id, request.id),
        )
        .await??;
        if !deleted {
            return Err(EngineError::NotFound(format!(
                "library group {}",
                request.id
            )));
        }
        Ok(())
    }
}
