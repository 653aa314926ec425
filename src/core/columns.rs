//! core::columns
//!
//! Content list columns.
//!
//! Each content list page shows a subset of the content attributes. A
//! channel can pick its listed attributes through `list_columns`
//! (comma-separated attribute names); otherwise the defaults apply. The
//! title is always listed.

use serde::{Deserialize, Serialize};

use super::model::{Channel, Site};

/// The content list page a column set is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Contents of one channel.
    Contents,
    /// Cross-channel content search.
    SearchContents,
    /// Contents awaiting checks.
    CheckContents,
    /// The recycle bin.
    RecycleContents,
}

/// A column of a content list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentColumn {
    pub attribute_name: String,
    pub display_name: String,
    pub input_type: InputType,
    pub is_list: bool,
    pub is_searchable: bool,
}

/// Input type of a column's attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputType {
    Text,
    Number,
    DateTime,
    /// Computed at read time, not stored.
    Computed,
}

/// Attribute name of the channel column added to cross-channel pages.
pub const CHANNEL_ATTRIBUTE: &str = "ChannelId";

const TITLE_ATTRIBUTE: &str = "Title";

const BUILT_IN: &[(&str, &str, InputType, bool)] = &[
    ("Id", "内容Id", InputType::Number, false),
    (TITLE_ATTRIBUTE, "标题", InputType::Text, true),
    ("GroupNames", "内容组", InputType::Text, true),
    ("TagNames", "标签", InputType::Text, true),
    ("AddDate", "添加时间", InputType::DateTime, false),
    ("LastEditDate", "最后修改时间", InputType::DateTime, false),
    ("AdminId", "添加人", InputType::Number, false),
    ("Hits", "点击量", InputType::Number, false),
    ("CheckState", "状态", InputType::Computed, false),
];

const DEFAULT_LIST: &[&str] = &[TITLE_ATTRIBUTE, "AddDate", "CheckState"];

/// Build the content list columns for a channel on the given page.
pub fn content_list_columns(_site: &Site, channel: &Channel, page: PageType) -> Vec<ContentColumn> {
    let listed: Vec<String> = match channel.list_columns.as_deref() {
        Some(list) if !list.trim().is_empty() => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => DEFAULT_LIST.iter().map(|s| s.to_string()).collect(),
    };

    let is_listed = |name: &str| {
        name == TITLE_ATTRIBUTE || listed.iter().any(|l| l.eq_ignore_ascii_case(name))
    };

    let mut columns: Vec<ContentColumn> = BUILT_IN
        .iter()
        .map(|(name, display, input_type, searchable)| ContentColumn {
            attribute_name: (*name).to_string(),
            display_name: (*display).to_string(),
            input_type: *input_type,
            is_list: is_listed(*name),
            is_searchable: *searchable,
        })
        .collect();

    if matches!(page, PageType::SearchContents | PageType::RecycleContents) {
        columns.insert(
            2,
            ContentColumn {
                attribute_name: CHANNEL_ATTRIBUTE.to_string(),
                display_name: "所属栏目".to_string(),
                input_type: InputType::Number,
                is_list: true,
                is_searchable: false,
            },
        );
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ChannelId, SiteId};

    fn channel(list_columns: Option<&str>) -> Channel {
        Channel {
            id: ChannelId::new(2),
            site_id: SiteId::new(1),
            parent_id: Some(ChannelId::new(1)),
            name: "news".into(),
            taxis: 1,
            list_columns: list_columns.map(String::from),
        }
    }

    fn listed(columns: &[ContentColumn]) -> Vec<&str> {
        columns
            .iter()
            .filter(|c| c.is_list)
            .map(|c| c.attribute_name.as_str())
            .collect()
    }

    #[test]
    fn defaults_apply_without_preference() {
        let site = Site::new(SiteId::new(1), "main");
        let columns = content_list_columns(&site, &channel(None), PageType::Contents);
        assert_eq!(listed(&columns), vec!["Title", "AddDate", "CheckState"]);
        assert!(columns.iter().all(|c| c.attribute_name != CHANNEL_ATTRIBUTE));
    }

    #[test]
    fn channel_preference_overrides_defaults_but_keeps_title() {
        let site = Site::new(SiteId::new(1), "main");
        let columns = content_list_columns(&site, &channel(Some("hits, tagnames")), PageType::Contents);
        assert_eq!(listed(&columns), vec!["Title", "TagNames", "Hits"]);
    }

    #[test]
    fn search_page_adds_channel_column() {
        let site = Site::new(SiteId::new(1), "main");
        let columns = content_list_columns(&site, &channel(None), PageType::SearchContents);
        assert_eq!(columns[2].attribute_name, CHANNEL_ATTRIBUTE);
        assert!(columns[2].is_list);
        assert_eq!(columns.len(), BUILT_IN.len() + 1);
    }
}
