//! core::types
//!
//! Strong identifier types for core domain concepts.
//!
//! # Types
//!
//! - [`SiteId`] - Site identifier
//! - [`ChannelId`] - Channel identifier (the root channel shares its site's id)
//! - [`ContentId`] - Content item identifier
//! - [`AdminId`] - Administrator identifier, the actor of record for mutations
//! - [`LibraryId`] - Media library item identifier
//! - [`GroupId`] - Media library group identifier (`0` means "no group")
//!
//! # Examples
//!
//! ```
//! use cascadework::core::types::{ChannelId, ContentId, SiteId};
//!
//! let site = SiteId::new(1);
//! let channel: ChannelId = "12".parse().unwrap();
//! assert_eq!(channel.get(), 12);
//! assert_eq!(site.to_string(), "1");
//!
//! let ids = ContentId::parse_list("101, 102,103").unwrap();
//! assert_eq!(ids, vec![ContentId::new(101), ContentId::new(102), ContentId::new(103)]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from identifier parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid {kind} id: '{value}'")]
    InvalidId { kind: &'static str, value: String },
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw identifier.
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Get the raw identifier.
            pub const fn get(self) -> u32 {
                self.0
            }

            /// Parse a comma-separated list of identifiers.
            ///
            /// Whitespace around entries is ignored; empty entries are skipped.
            pub fn parse_list(list: &str) -> Result<Vec<Self>, TypeError> {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::parse::<Self>)
                    .collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u32>()
                    .map(Self)
                    .map_err(|_| TypeError::InvalidId {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// Identifier of a site.
    SiteId,
    "site"
);
id_type!(
    /// Identifier of a channel within a site.
    ChannelId,
    "channel"
);
id_type!(
    /// Identifier of a content item.
    ContentId,
    "content"
);
id_type!(
    /// Identifier of an administrator.
    AdminId,
    "admin"
);
id_type!(
    /// Identifier of a media library item.
    LibraryId,
    "library"
);
id_type!(
    /// Identifier of a media library group.
    GroupId,
    "group"
);

impl GroupId {
    /// The "no group" / "all groups" sentinel.
    pub const NONE: GroupId = GroupId(0);

    /// Whether this is the sentinel group.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}
