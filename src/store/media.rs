//! store::media
//!
//! Filesystem-backed media storage.
//!
//! Uploaded files are written under `<root>/<site_id>/upload/videos/` with a
//! generated name that keeps the original extension. URLs are the same
//! relative path prefixed with `/`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use super::traits::{MediaStore, StoreError};
use crate::core::types::SiteId;

/// Generated storage name for an uploaded file, keeping its extension.
pub fn stored_file_name(file_name: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", id, ext.to_lowercase()),
        None => id,
    }
}

/// Media store writing files below a root directory.
#[derive(Debug, Clone)]
pub struct FileMediaStore {
    root: PathBuf,
}

impl FileMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a media URL to a path under the root, rejecting traversal.
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)));
        safe.then(|| self.root.join(relative))
    }
}

#[async_trait]
impl MediaStore for FileMediaStore {
    async fn put(
        &self,
        site_id: SiteId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        let url = format!("/{}/upload/videos/{}", site_id, stored_file_name(file_name));
        let path = self
            .resolve(&url)
            .ok_or_else(|| StoreError::Backend(format!("invalid media path: {}", url)))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(%url, size = bytes.len(), "stored media");
        Ok(url)
    }

    async fn remove(&self, url: &str) -> Result<(), StoreError> {
        let Some(path) = self.resolve(url) else {
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stored_name_keeps_extension() {
        let name = stored_file_name("Intro Clip.MP4");
        assert!(name.ends_with(".mp4"));
        assert_ne!(stored_file_name("a.mp4"), stored_file_name("a.mp4"));
    }

    #[test]
    fn traversal_is_rejected() {
        let store = FileMediaStore::new("/srv/media");
        assert!(store.resolve("/../etc/passwd").is_none());
        assert_eq!(
            store.resolve("/1/upload/videos/a.mp4"),
            Some(PathBuf::from("/srv/media/1/upload/videos/a.mp4"))
        );
    }

    #[tokio::test]
    async fn put_then_remove() {
        let temp = TempDir::new().expect("create temp dir");
        let store = FileMediaStore::new(temp.path());

        let url = store
            .put(SiteId::new(1), "clip.webm", b"bytes")
            .await
            .unwrap();
        let path = temp.path().join(url.trim_start_matches('/'));
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");

        store.remove(&url).await.unwrap();
        assert!(!path.exists());
        // Removing again is fine.
        store.remove(&url).await.unwrap();
    }
}
