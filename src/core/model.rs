//! core::model
//!
//! Persisted entities: sites, channels and content items.
//!
//! Repositories own these values; the engine only reads them and asks the
//! repositories to apply state changes (see [`crate::store`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{AdminId, ChannelId, ContentId, SiteId};

/// A site: the top-level content container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    /// Public URL of the site (no trailing slash required).
    #[serde(default)]
    pub url: String,
    /// Root channel of the site's channel tree.
    pub root_channel_id: ChannelId,
    /// Whether multi-level content checking is enabled.
    #[serde(default)]
    pub is_check_content_level: bool,
    /// Number of check levels (1..=5) when multi-level checking is enabled.
    #[serde(default = "default_check_level")]
    pub check_content_level: u8,
}

fn default_check_level() -> u8 {
    1
}

impl Site {
    /// Create a site whose root channel shares its id.
    pub fn new(id: SiteId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            url: String::new(),
            root_channel_id: ChannelId::new(id.get()),
            is_check_content_level: false,
            check_content_level: 1,
        }
    }

    /// The number of check levels actually in force, clamped to 1..=5.
    pub fn effective_check_level(&self) -> u8 {
        if self.is_check_content_level {
            self.check_content_level.clamp(1, 5)
        } else {
            1
        }
    }
}

/// A node in a site's channel tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: ChannelId,
    pub site_id: SiteId,
    /// Parent channel; `None` for the root channel.
    #[serde(default)]
    pub parent_id: Option<ChannelId>,
    pub name: String,
    /// Display order among siblings (ascending).
    #[serde(default)]
    pub taxis: i32,
    /// Comma-separated attribute names shown in content lists.
    #[serde(default)]
    pub list_columns: Option<String>,
}

impl Channel {
    /// Project this channel into a [`ChannelSummary`].
    pub fn summary(&self) -> ChannelSummary {
        ChannelSummary {
            id: self.id,
            site_id: self.site_id,
            parent_id: self.parent_id,
            name: self.name.clone(),
            taxis: self.taxis,
        }
    }

    /// Whether this is a root channel.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Lightweight projection of a [`Channel`] used by tree traversal and
/// per-node metric functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub id: ChannelId,
    pub site_id: SiteId,
    pub parent_id: Option<ChannelId>,
    pub name: String,
    pub taxis: i32,
}

/// Lifecycle status of a content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    #[default]
    Active,
    Recycled,
}

/// A content item inside a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: ContentId,
    pub site_id: SiteId,
    pub channel_id: ChannelId,
    pub title: String,
    /// Whether the content passed the final check level.
    #[serde(default)]
    pub checked: bool,
    /// Workflow stage when not checked (see [`crate::core::check`]).
    #[serde(default)]
    pub checked_level: i32,
    #[serde(default)]
    pub admin_id: Option<AdminId>,
    #[serde(default)]
    pub group_names: Vec<String>,
    #[serde(default)]
    pub tag_names: Vec<String>,
    #[serde(default)]
    pub hits: u64,
    pub add_date: DateTime<Utc>,
    pub last_edit_date: DateTime<Utc>,
    #[serde(default)]
    pub status: ContentStatus,
    /// Actor of record for the last recycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recycled_by: Option<AdminId>,
}

impl Content {
    /// Create an active, checked content item.
    pub fn new(
        id: ContentId,
        site_id: SiteId,
        channel_id: ChannelId,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            site_id,
            channel_id,
            title: title.into(),
            checked: true,
            checked_level: 0,
            admin_id: None,
            group_names: Vec::new(),
            tag_names: Vec::new(),
            hits: 0,
            add_date: now,
            last_edit_date: now,
            status: ContentStatus::Active,
            recycled_by: None,
        }
    }

    /// Whether the item is live (not in the recycle bin).
    pub fn is_active(&self) -> bool {
        self.status == ContentStatus::Active
    }

    /// Serialise the item into a field map keyed by camelCase attribute names.
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // Structs always serialise to objects.
            other => {
                let mut map = Map::new();
                map.insert("value".into(), other);
                Ok(map)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_channel_shares_site_id() {
        let site = Site::new(SiteId::new(3), "main");
        assert_eq!(site.root_channel_id, ChannelId::new(3));
    }

    #[test]
    fn effective_check_level_is_clamped() {
        let mut site = Site::new(SiteId::new(1), "main");
        site.check_content_level = 9;
        assert_eq!(site.effective_check_level(), 1);

        site.is_check_content_level = true;
        assert_eq!(site.effective_check_level(), 5);

        site.check_content_level = 0;
        assert_eq!(site.effective_check_level(), 1);

        site.check_content_level = 3;
        assert_eq!(site.effective_check_level(), 3);
    }

    #[test]
    fn summary_copies_tree_fields() {
        let channel = Channel {
            id: ChannelId::new(5),
            site_id: SiteId::new(1),
            parent_id: Some(ChannelId::new(1)),
            name: "news".into(),
            taxis: 4,
            list_columns: Some("Title,Hits".into()),
        };
        let summary = channel.summary();
        assert_eq!(summary.id, channel.id);
        assert_eq!(summary.parent_id, Some(ChannelId::new(1)));
        assert_eq!(summary.taxis, 4);
        assert!(!channel.is_root());
    }

    #[test]
    fn content_fields_use_camel_case() {
        let content = Content::new(
            ContentId::new(101),
            SiteId::new(1),
            ChannelId::new(2),
            "Hello",
        );
        let fields = content.to_fields().unwrap();
        assert_eq!(fields["id"], Value::from(101));
        assert_eq!(fields["channelId"], Value::from(2));
        assert_eq!(fields["title"], Value::from("Hello"));
        assert_eq!(fields["status"], Value::from("active"));
        assert!(fields.contains_key("addDate"));
        assert!(!fields.contains_key("recycledBy"));
    }
}
