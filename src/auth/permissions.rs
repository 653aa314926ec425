//! auth::permissions
//!
//! Permission keys.
//!
//! Site permissions apply to a whole site; channel permissions are checked
//! against a (site, channel) pair. Both serialise to the CMS's stable key
//! strings (e.g. `cms_contentDelete`).
//!
//! # Example
//!
//! ```
//! use cascadework::auth::permissions::{ChannelPermission, SitePermission};
//!
//! assert_eq!(SitePermission::ContentsSearch.key(), "cms_contentsSearch");
//! assert_eq!(
//!     "cms_contentDelete".parse::<ChannelPermission>().unwrap(),
//!     ChannelPermission::ContentDelete
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a permission key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown permission key: '{0}'")]
pub struct UnknownPermission(pub String);

/// A permission scoped to a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SitePermission {
    #[serde(rename = "cms_contentsSearch")]
    ContentsSearch,
    #[serde(rename = "cms_createContents")]
    CreateContents,
    #[serde(rename = "cms_library")]
    Library,
}

impl SitePermission {
    pub const ALL: [SitePermission; 3] = [
        SitePermission::ContentsSearch,
        SitePermission::CreateContents,
        SitePermission::Library,
    ];

    /// Stable key string.
    pub fn key(&self) -> &'static str {
        match self {
            SitePermission::ContentsSearch => "cms_contentsSearch",
            SitePermission::CreateContents => "cms_createContents",
            SitePermission::Library => "cms_library",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            SitePermission::ContentsSearch => "search contents",
            SitePermission::CreateContents => "create contents",
            SitePermission::Library => "manage the media library",
        }
    }
}

impl fmt::Display for SitePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SitePermission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// A permission scoped to a channel within a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelPermission {
    #[serde(rename = "cms_contentAdd")]
    ContentAdd,
    #[serde(rename = "cms_contentDelete")]
    ContentDelete,
    #[serde(rename = "cms_contentEdit")]
    ContentEdit,
    #[serde(rename = "cms_contentArrange")]
    ContentArrange,
    #[serde(rename = "cms_contentTranslate")]
    ContentTranslate,
    #[serde(rename = "cms_contentCheckLevel1")]
    ContentCheckLevel1,
    #[serde(rename = "cms_createPage")]
    CreatePage,
    #[serde(rename = "cms_channelEdit")]
    ChannelEdit,
}

impl ChannelPermission {
    pub const ALL: [ChannelPermission; 8] = [
        ChannelPermission::ContentAdd,
        ChannelPermission::ContentDelete,
        ChannelPermission::ContentEdit,
        ChannelPermission::ContentArrange,
        ChannelPermission::ContentTranslate,
        ChannelPermission::ContentCheckLevel1,
        ChannelPermission::CreatePage,
        ChannelPermission::ChannelEdit,
    ];

    /// Stable key string.
    pub fn key(&self) -> &'static str {
        match self {
            ChannelPermission::ContentAdd => "cms_contentAdd",
            ChannelPermission::ContentDelete => "cms_contentDelete",
            ChannelPermission::ContentEdit => "cms_contentEdit",
            ChannelPermission::ContentArrange => "cms_contentArrange",
            ChannelPermission::ContentTranslate => "cms_contentTranslate",
            ChannelPermission::ContentCheckLevel1 => "cms_contentCheckLevel1",
            ChannelPermission::CreatePage => "cms_createPage",
            ChannelPermission::ChannelEdit => "cms_channelEdit",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            ChannelPermission::ContentAdd => "add contents",
            ChannelPermission::ContentDelete => "delete contents",
            ChannelPermission::ContentEdit => "edit contents",
            ChannelPermission::ContentArrange => "arrange contents",
            ChannelPermission::ContentTranslate => "move contents between channels",
            ChannelPermission::ContentCheckLevel1 => "check contents",
            ChannelPermission::CreatePage => "generate pages",
            ChannelPermission::ChannelEdit => "edit the channel",
        }
    }
}

impl fmt::Display for ChannelPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ChannelPermission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// Either kind of permission, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Site(SitePermission),
    Channel(ChannelPermission),
}

impl Permission {
    pub fn key(&self) -> &'static str {
        match self {
            Permission::Site(p) => p.key(),
            Permission::Channel(p) => p.key(),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<SitePermission> for Permission {
    fn from(p: SitePermission) -> Self {
        Permission::Site(p)
    }
}

impl From<ChannelPermission> for Permission {
    fn from(p: ChannelPermission) -> Self {
        Permission::Channel(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_back() {
        for p in SitePermission::ALL {
            assert_eq!(p.key().parse::<SitePermission>().unwrap(), p);
        }
        for p in ChannelPermission::ALL {
            assert_eq!(p.key().parse::<ChannelPermission>().unwrap(), p);
        }
    }

    #[test]
    fn unknown_key_is_error() {
        let err = "cms_nuke".parse::<ChannelPermission>().unwrap_err();
        assert_eq!(err.to_string(), "unknown permission key: 'cms_nuke'");
    }

    #[test]
    fn serde_uses_key_strings() {
        let json = serde_json::to_string(&ChannelPermission::CreatePage).unwrap();
        assert_eq!(json, "\"cms_createPage\"");
        let parsed: SitePermission = serde_json::from_str("\"cms_library\"").unwrap();
        assert_eq!(parsed, SitePermission::Library);
    }

    #[test]
    fn permission_display_is_key() {
        let p: Permission = ChannelPermission::ContentDelete.into();
        assert_eq!(p.to_string(), "cms_contentDelete");
    }
}
