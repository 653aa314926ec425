//! engine
//!
//! Orchestrates every request: Gate -> Resolve -> Operate -> Shape.
//!
//! # Architecture
//!
//! The engine is the only layer that combines the permission oracle with the
//! repositories. Each public operation follows the same lifecycle:
//!
//! 1. **Gate**: the principal must be logged in and hold the operation's
//!    permission, checked before any repository access
//! 2. **Resolve**: site, channel and content lookups; absence is `NotFound`
//! 3. **Operate**: cascade aggregation, the deletion pipeline, or a library
//!    mutation
//! 4. **Shape**: return a serialisable result
//!
//! # Operations
//!
//! - [`Engine::tree`] - channel tree with content counts ([`tree`])
//! - [`Engine::delete_confirmation`] / [`Engine::delete_contents`] ([`delete`])
//! - media library operations ([`library`])
//!
//! # Invariants
//!
//! - No repository is touched before the gate passes
//! - The engine holds no mutable state between requests
//! - Caller cancellation aborts cleanly up to the point of no return of a
//!   mutation; later steps always complete

pub mod cancel;
pub mod cascade;
pub mod delete;
pub mod gate;
pub mod library;
pub mod tree;

pub use cascade::{build_cascade, Cascade};
pub use delete::{DeleteConfirmRequest, DeleteOutcome, DeleteStage, DeleteSubmitRequest};
pub use library::{
    CreateRequest, DeleteRequest, DownloadRequest, GroupDeleteRequest, GroupRenameRequest,
    GroupRequest, QueryRequest, QueryResult,
};
pub use tree::{ContentCount, Permissions, TreeRequest, TreeResult};

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::auth::{Permission, PermissionOracle, Principal};
use crate::core::config::{CleanupPolicy, Config};
use crate::core::types::ContentId;
use crate::store::traits::{
    AuditLog, ChannelRepository, ContentRepository, GroupRepository, LibraryRepository,
    MediaStore, Publisher, SiteRepository, StoreError, TagRepository,
};
use crate::store::MemoryStore;

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The principal is not logged in.
    #[error("authentication required")]
    Unauthenticated,

    /// The principal is logged in but lacks a permission.
    #[error("permission denied: {permission}")]
    Unauthorized { permission: Permission },

    /// A site, channel, content item or library record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request is malformed.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Physical cleanup failed for some items and the strict cleanup policy
    /// aborted the batch before recycling.
    #[error("failed to remove generated files of {} content item(s)", .failed.len())]
    PartialCleanupFailure { failed: Vec<ContentId> },

    /// A repository call failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,
}

/// Engine tuning derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Maximum in-flight metric calls while building a cascade (1 = sequential).
    pub metric_concurrency: usize,
    pub cleanup_policy: CleanupPolicy,
    /// Page size used when a library query asks for 0 items per page.
    pub library_page_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            metric_concurrency: config.metric_concurrency().max(1),
            cleanup_policy: config.cleanup_policy(),
            library_page_size: config.library_page_size().max(1),
        }
    }
}

/// The collaborators an engine runs against.
#[derive(Clone)]
pub struct Services {
    pub oracle: Arc<dyn PermissionOracle>,
    pub sites: Arc<dyn SiteRepository>,
    pub channels: Arc<dyn ChannelRepository>,
    pub contents: Arc<dyn ContentRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub publisher: Arc<dyn Publisher>,
    pub audit: Arc<dyn AuditLog>,
    pub library: Arc<dyn LibraryRepository>,
    pub media: Arc<dyn MediaStore>,
}

impl Services {
    /// Back every repository with one in-memory store.
    pub fn memory(store: &MemoryStore, oracle: Arc<dyn PermissionOracle>) -> Self {
        Self {
            oracle,
            sites: Arc::new(store.clone()),
            channels: Arc::new(store.clone()),
            contents: Arc::new(store.clone()),
            groups: Arc::new(store.clone()),
            tags: Arc::new(store.clone()),
            publisher: Arc::new(store.clone()),
            audit: Arc::new(store.clone()),
            library: Arc::new(store.clone()),
            media: Arc::new(store.clone()),
        }
    }

    /// Replace the media store.
    pub fn with_media(mut self, media: Arc<dyn MediaStore>) -> Self {
        self.media = media;
        self
    }

    /// Replace the content repository.
    pub fn with_contents(mut self, contents: Arc<dyn ContentRepository>) -> Self {
        self.contents = contents;
        self
    }

    /// Replace the publisher.
    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = publisher;
        self
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// The request's actor and its cancellation signal.
#[derive(Debug, Clone)]
pub struct Caller {
    pub principal: Principal,
    pub cancel: CancellationToken,
}

impl Caller {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(principal: Principal, cancel: CancellationToken) -> Self {
        Self { principal, cancel }
    }
}

/// Entry point for all operations.
#[derive(Debug, Clone)]
pub struct Engine {
    services: Services,
    settings: EngineSettings,
}

impl Engine {
    pub fn new(services: Services, settings: EngineSettings) -> Self {
        Self { services, settings }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}
