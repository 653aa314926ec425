//! cascadework - permission-gated channel trees and content recycling
//!
//! cascadework is the request core of a content-management back office: it
//! answers "what may this administrator do here", builds channel trees
//! annotated with per-channel metrics, moves content to the recycle bin with
//! an audit trail, and manages a video media library.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates Gate → Resolve → Operate → Shape for every request
//! - [`auth`] - Principals, permission keys and the permission oracle
//! - [`core`] - Domain types, check states, list columns, configuration
//! - [`store`] - Repository traits, the in-memory store and its JSON snapshot
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! 1. No repository is consulted before the caller passes the permission gate
//! 2. A cascade contains each reachable channel exactly once, in display order
//! 3. A delete batch writes one audit entry and one change notification
//! 4. Recycling is soft: recycled content stays retrievable

pub mod auth;
pub mod cli;
pub mod core;
pub mod engine;
pub mod store;
pub mod ui;
