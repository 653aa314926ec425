//! core
//!
//! Core domain types and schemas for cascadework.
//!
//! # Modules
//!
//! - [`types`] - Strong identifier types: SiteId, ChannelId, ContentId, etc.
//! - [`model`] - Sites, channels and content items
//! - [`check`] - Content check (approval) states and levels
//! - [`columns`] - Content list column definitions
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing keeps ids of different entities apart
//! - Schemas are strict and self-describing
//! - Nothing here performs I/O except configuration loading

pub mod check;
pub mod columns;
pub mod config;
pub mod model;
pub mod types;
