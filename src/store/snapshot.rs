//! store::snapshot
//!
//! JSON store file used by the CLI.
//!
//! # Storage
//!
//! - `<path>` - pretty-printed [`StoreSnapshot`]
//! - `<path>.lock` - lock file holding an OS-level exclusive lock
//!
//! # Invariants
//!
//! - The lock is held from open until the [`StoreFile`] is dropped
//! - Lock acquisition is non-blocking (fails fast if locked)
//! - Saves are atomic: the snapshot is written to `<path>.tmp`, synced, then
//!   renamed over `<path>`
//!
//! # Example
//!
//! ```no_run
//! use cascadework::store::snapshot::StoreFile;
//! use std::path::Path;
//!
//! let file = StoreFile::open(Path::new("cascadework.json")).unwrap();
//! let mut snapshot = file.load().unwrap();
//! snapshot.audit.clear();
//! file.save(&snapshot).unwrap();
//! // lock released on drop
//! ```

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use super::traits::{AuditEntry, LibraryGroup, LibraryVideo, StoreError};
use crate::auth::{AdminGrants, Administrator};
use crate::core::model::{Channel, Content, Site};
use crate::core::types::{ContentId, SiteId};

/// Everything the in-memory store holds, in serialisable form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub sites: Vec<Site>,
    pub channels: Vec<Channel>,
    pub contents: Vec<Content>,
    /// Content group names per site.
    pub content_groups: Vec<NamedSet>,
    /// Content tag names per site.
    pub content_tags: Vec<NamedSet>,
    pub administrators: Vec<Administrator>,
    pub grants: Vec<AdminGrants>,
    pub audit: Vec<AuditEntry>,
    pub library_groups: Vec<LibraryGroup>,
    pub library_videos: Vec<LibraryVideo>,
    /// Contents that currently have generated files.
    pub artifacts: BTreeSet<ContentId>,
}

/// Names attached to one site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSet {
    pub site_id: SiteId,
    pub names: Vec<String>,
}

impl StoreSnapshot {
    /// Find an administrator by user name.
    pub fn administrator(&self, user_name: &str) -> Option<&Administrator> {
        self.administrators.iter().find(|a| a.user_name == user_name)
    }
}

/// An open, locked store file.
#[derive(Debug)]
pub struct StoreFile {
    path: PathBuf,
    lock: Option<File>,
}

impl StoreFile {
    /// Open a store file and take its exclusive lock.
    ///
    /// The store file itself need not exist yet; [`StoreFile::load`] then
    /// yields an empty snapshot.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Lock`] if another process holds the lock
    /// - [`StoreError::Io`] if the lock file cannot be created
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let lock_path = Self::sibling(path, "lock");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path: path.to_path_buf(),
                lock: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(StoreError::Lock(
                format!("{} is locked by another process", path.display()),
            )),
            Err(e) => Err(StoreError::Lock(e.to_string())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot; a missing file is an empty store.
    pub fn load(&self) -> Result<StoreSnapshot, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreSnapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically replace the store file with `snapshot`.
    pub fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(snapshot)?;
        let tmp = Self::sibling(&self.path, "tmp");

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn sibling(path: &Path, extension: &str) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }
}

impl Drop for StoreFile {
    fn drop(&mut self) {
        if let Some(file) = self.lock.take() {
            let _ = file.unlock();
        }
    }
}
