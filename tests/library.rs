//! Integration tests for the video library.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use cascadework::core::types::{GroupId, LibraryId, SiteId};
use cascadework::engine::library::{
    CreateRequest, DeleteRequest, DownloadRequest, GroupDeleteRequest, GroupRenameRequest,
    GroupRequest, QueryRequest, UpdateRequest,
};
use cascadework::engine::{Caller, Engine, EngineError, EngineSettings};
use cascadework::store::memory::{FailOn, StoreOperation};
use cascadework::store::{LibraryVideo, MediaStore, MemoryStore, StoreError};
use tokio_util::sync::CancellationToken;

use common::*;

fn upload(file_name: &str, group_id: GroupId) -> CreateRequest {
    CreateRequest {
        site_id: SITE,
        group_id,
        file_name: file_name.to_string(),
        bytes: b"\x00\x00\x00\x18ftypmp42".to_vec(),
    }
}

fn query(page: usize, per_page: usize) -> QueryRequest {
    QueryRequest {
        site_id: SITE,
        page,
        per_page,
        ..Default::default()
    }
}

async fn seed(engine: &Engine, caller: &Caller, names: &[&str]) -> Vec<LibraryVideo> {
    let mut videos = Vec::new();
    for name in names {
        videos.push(
            engine
                .library_create(caller, &upload(name, GroupId::NONE))
                .await
                .unwrap(),
        );
    }
    videos
}

#[tokio::test]
async fn upload_stores_media_and_record() {
    let store = store();
    let engine = engine(&store);

    let video = engine
        .library_create(&caller("librarian"), &upload("Launch Day.MP4", GroupId::NONE))
        .await
        .unwrap();

    assert_eq!(video.title, "Launch Day");
    assert_eq!(video.file_type, "mp4");
    assert!(video.url.starts_with("/1/upload/videos/"));
    assert!(video.url.ends_with(".mp4"));
    assert!(store.media(&video.url).is_some());
}

#[tokio::test]
async fn upload_validation() {
    let store = store();
    let engine = engine(&store);
    let caller = caller("librarian");

    let result = engine
        .library_create(&caller, &upload("notes.txt", GroupId::NONE))
        .await;
    assert!(matches!(result, Err(EngineError::ValidationFailed(_))));

    let empty = CreateRequest {
        bytes: Vec::new(),
        ..upload("clip.mp4", GroupId::NONE)
    };
    let result = engine.library_create(&caller, &empty).await;
    assert!(matches!(result, Err(EngineError::ValidationFailed(_))));

    let result = engine
        .library_create(&caller, &upload("clip.mp4", GroupId::new(42)))
        .await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));

    let result = engine.library_query(&caller, &query(1, 10)).await.unwrap();
    assert_eq!(result.count, 0);
}

#[tokio::test]
async fn failed_insert_removes_uploaded_media() {
    let store = store().fail_on(FailOn::LibraryWrite);
    let result = engine(&store)
        .library_create(&caller("librarian"), &upload("clip.mp4", GroupId::NONE))
        .await;

    assert!(matches!(result, Err(EngineError::Store(_))));
    let uploaded: Vec<String> = store
        .operations()
        .into_iter()
        .filter_map(|op| match op {
            StoreOperation::PutMedia { url } => Some(url),
            _ => None,
        })
        .collect();
    assert_eq!(uploaded.len(), 1);
    assert!(store.media(&uploaded[0]).is_none());
}

struct CancelAfterUpload {
    inner: MemoryStore,
    token: CancellationToken,
}

#[async_trait]
impl MediaStore for CancelAfterUpload {
    async fn put(&self, site_id: SiteId, file_name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let url = self.inner.put(site_id, file_name, bytes).await?;
        self.token.cancel();
        tokio::task::yield_now().await;
        Ok(url)
    }

    async fn remove(&self, url: &str) -> Result<(), StoreError> {
        self.inner.remove(url).await
    }
}

#[tokio::test]
async fn cancel_after_upload_keeps_media_and_record_together() {
    let store = store();
    let token = CancellationToken::new();
    let media = Arc::new(CancelAfterUpload {
        inner: store.clone(),
        token: token.clone(),
    });
    let engine = Engine::new(services(&store).with_media(media), EngineSettings::default());
    let caller = Caller::with_cancel(caller("librarian").principal, token);

    let video = engine
        .library_create(&caller, &upload("clip.mp4", GroupId::NONE))
        .await
        .unwrap();

    assert!(store.media(&video.url).is_some());
    let listed = engine
        .library_query(&Caller::new(caller.principal.clone()), &query(1, 10))
        .await
        .unwrap();
    assert_eq!(listed.count, 1);
}

#[tokio::test]
async fn cancelled_upload_stores_nothing() {
    let store = store();
    let caller = caller("librarian");
    caller.cancel.cancel();

    let result = engine(&store)
        .library_create(&caller, &upload("clip.mp4", GroupId::NONE))
        .await;

    assert!(matches!(result, Err(EngineError::Cancelled)));
    assert!(!store
        .operations()
        .iter()
        .any(|op| matches!(op, StoreOperation::PutMedia { .. })));
}

#[tokio::test]
async fn query_pages_newest_first() {
    let store = store();
    let engine = engine(&store);
    let caller = caller("librarian");
    seed(&engine, &caller, &["a.mp4", "b.webm", "c.mkv"]).await;

    let first = engine.library_query(&caller, &query(1, 2)).await.unwrap();
    assert_eq!(first.count, 3);
    let titles: Vec<&str> = first.items.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, vec!["c", "b"]);

    let second = engine.library_query(&caller, &query(2, 2)).await.unwrap();
    assert_eq!(second.count, 3);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].title, "a");

    let beyond = engine.library_query(&caller, &query(5, 2)).await.unwrap();
    assert!(beyond.items.is_empty());
}

#[tokio::test]
async fn zero_per_page_uses_configured_size() {
    let store = store();
    let settings = EngineSettings {
        library_page_size: 2,
        ..EngineSettings::default()
    };
    let engine = engine_with(&store, settings);
    let caller = caller("librarian");
    seed(&engine, &caller, &["a.mp4", "b.mp4", "c.mp4"]).await;

    let result = engine.library_query(&caller, &query(0, 0)).await.unwrap();
    assert_eq!(result.items.len(), 2);
    assert_eq!(result.count, 3);
}

#[tokio::test]
async fn query_filters_by_keyword_and_group() {
    let store = store();
    let engine = engine(&store);
    let caller = caller("librarian");

    let group = engine
        .library_add_group(
            &caller,
            &GroupRequest {
                site_id: SITE,
                name: "宣传片".to_string(),
            },
        )
        .await
        .unwrap();
    engine
        .library_create(&caller, &upload("Product Tour.mp4", group.id))
        .await
        .unwrap();
    seed(&engine, &caller, &["interview.mov"]).await;

    let by_keyword = QueryRequest {
        keyword: Some("TOUR".to_string()),
        ..query(1, 10)
    };
    let result = engine.library_query(&caller, &by_keyword).await.unwrap();
    assert_eq!(result.count, 1);
    assert_eq!(result.items[0].title, "Product Tour");
    assert_eq!(result.groups, vec![group.clone()]);

    let by_group = QueryRequest {
        group_id: group.id,
        ..query(1, 10)
    };
    let result = engine.library_query(&caller, &by_group).await.unwrap();
    assert_eq!(result.count, 1);

    let all = engine.library_query(&caller, &query(1, 10)).await.unwrap();
    assert_eq!(all.count, 2);
}

#[tokio::test]
async fn update_changes_title_and_group() {
    let store = store();
    let engine = engine(&store);
    let caller = caller("librarian");
    let video = seed(&engine, &caller, &["raw.mp4"]).await.remove(0);
    let group = engine
        .library_add_group(
            &caller,
            &GroupRequest {
                site_id: SITE,
                name: "成片".to_string(),
            },
        )
        .await
        .unwrap();

    let request = UpdateRequest {
        site_id: SITE,
        id: video.id,
        title: "  Final Cut ".to_string(),
        group_id: group.id,
    };
    let updated = engine.library_update(&caller, &request).await.unwrap();
    assert_eq!(updated.title, "Final Cut");
    assert_eq!(updated.group_id, group.id);
    assert_eq!(updated.url, video.url);

    let blank = UpdateRequest {
        title: " ".to_string(),
        ..request.clone()
    };
    let result = engine.library_update(&caller, &blank).await;
    assert!(matches!(result, Err(EngineError::ValidationFailed(_))));

    let missing = UpdateRequest {
        id: LibraryId::new(999),
        ..request
    };
    let result = engine.library_update(&caller, &missing).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn delete_removes_record_and_media() {
    let store = store();
    let engine = engine(&store);
    let caller = caller("librarian");
    let video = seed(&engine, &caller, &["clip.mp4"]).await.remove(0);

    let download = DownloadRequest {
        site_id: SITE,
        library_id: video.id,
    };
    assert_eq!(
        engine.library_download(&caller, &download).await.unwrap(),
        video.url
    );

    engine
        .library_delete(
            &caller,
            &DeleteRequest {
                site_id: SITE,
                id: video.id,
            },
        )
        .await
        .unwrap();

    assert!(store.media(&video.url).is_none());
    let result = engine.library_download(&caller, &download).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn group_names_are_unique_and_non_empty() {
    let store = store();
    let engine = engine(&store);
    let caller = caller("librarian");
    let add = |name: &str| GroupRequest {
        site_id: SITE,
        name: name.to_string(),
    };

    let first = engine.library_add_group(&caller, &add("新闻")).await.unwrap();
    let second = engine.library_add_group(&caller, &add("专题")).await.unwrap();

    let result = engine.library_add_group(&caller, &add(" 新闻 ")).await;
    assert!(matches!(result, Err(EngineError::ValidationFailed(_))));
    let result = engine.library_add_group(&caller, &add("  ")).await;
    assert!(matches!(result, Err(EngineError::ValidationFailed(_))));

    let rename = |id: GroupId, name: &str| GroupRenameRequest {
        site_id: SITE,
        id,
        name: name.to_string(),
    };
    let result = engine
        .library_rename_group(&caller, &rename(second.id, "新闻"))
        .await;
    assert!(matches!(result, Err(EngineError::ValidationFailed(_))));

    // Renaming to its own name is allowed.
    let same = engine
        .library_rename_group(&caller, &rename(first.id, "新闻"))
        .await
        .unwrap();
    assert_eq!(same.name, "新闻");

    let renamed = engine
        .library_rename_group(&caller, &rename(second.id, "特别报道"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "特别报道");
}

#[tokio::test]
async fn deleting_group_ungroups_its_videos() {
    let store = store();
    let engine = engine(&store);
    let caller = caller("librarian");
    let group = engine
        .library_add_group(
            &caller,
            &GroupRequest {
                site_id: SITE,
                name: "archive".to_string(),
            },
        )
        .await
        .unwrap();
    let video = engine
        .library_create(&caller, &upload("old.avi", group.id))
        .await
        .unwrap();

    engine
        .library_delete_group(
            &caller,
            &GroupDeleteRequest {
                site_id: SITE,
                id: group.id,
            },
        )
        .await
        .unwrap();

    let result = engine.library_query(&caller, &query(1, 10)).await.unwrap();
    assert!(result.groups.is_empty());
    assert_eq!(result.items[0].id, video.id);
    assert_eq!(result.items[0].group_id, GroupId::NONE);

    let again = engine
        .library_delete_group(
            &caller,
            &GroupDeleteRequest {
                site_id: SITE,
                id: group.id,
            },
        )
        .await;
    assert!(matches!(again, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn library_requires_its_permission() {
    let store = store();
    let engine = engine(&store);

    let result = engine.library_query(&caller("editor"), &query(1, 10)).await;
    assert!(matches!(result, Err(EngineError::Unauthorized { .. })));

    let result = engine.library_query(&anonymous(), &query(1, 10)).await;
    assert!(matches!(result, Err(EngineError::Unauthenticated)));

    let other_site = QueryRequest {
        site_id: OTHER_SITE,
        ..query(1, 10)
    };
    let result = engine.library_query(&caller("librarian"), &other_site).await;
    assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
}

#[tokio::test]
async fn videos_are_scoped_to_their_site() {
    let store: MemoryStore = store();
    let engine = engine(&store);
    let video = seed(&engine, &caller("admin"), &["clip.mp4"]).await.remove(0);

    let request = DownloadRequest {
        site_id: OTHER_SITE,
        library_id: video.id,
    };
    let result = engine.library_download(&caller("admin"), &request).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}
