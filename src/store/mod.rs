//! store
//!
//! Repository layer consumed by the engine.
//!
//! # Modules
//!
//! - [`traits`] - Async repository traits and their DTOs
//! - [`memory`] - In-memory implementation of every trait
//! - [`snapshot`] - Locked JSON snapshot file used by the CLI
//! - [`media`] - Filesystem media storage

pub mod media;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{
    AuditEntry, AuditLog, ChannelRepository, ContentRepository, GroupRepository, LibraryGroup,
    LibraryRepository, LibraryVideo, MediaStore, PublishError, Publisher, SiteRepository,
    StoreError, TagRepository,
};
