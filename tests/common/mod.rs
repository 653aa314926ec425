//! Shared fixture for integration tests.
//!
//! Site 1 ("main"):
//!
//! ```text
//! 首页 [1]
//! ├── 新闻 [2]          contents 101, 102
//! │   ├── 国际 [5]      (taxis 1)
//! │   └── 国内 [4]      (taxis 2) content 103
//! └── 公告 [3]
//! ```
//!
//! Site 2 ("other") has a single root channel 20.
//!
//! Administrators: `admin` (super), `editor` (contents search on site 1,
//! delete in channel 2), `viewer` (no grants), `librarian` (library on site 1).

#![allow(dead_code)]

use std::sync::Arc;

use cascadework::auth::{
    AdminGrants, Administrator, ChannelGrant, ChannelPermission, GrantTable, Principal, SiteGrant,
    SitePermission,
};
use cascadework::core::model::{Channel, Content, Site};
use cascadework::core::types::{AdminId, ChannelId, ContentId, SiteId};
use cascadework::engine::{Caller, Engine, EngineSettings, Services};
use cascadework::store::snapshot::{NamedSet, StoreSnapshot};
use cascadework::store::MemoryStore;

pub const SITE: SiteId = SiteId::new(1);
pub const OTHER_SITE: SiteId = SiteId::new(2);
pub const ROOT: ChannelId = ChannelId::new(1);
pub const NEWS: ChannelId = ChannelId::new(2);
pub const NOTICES: ChannelId = ChannelId::new(3);
pub const DOMESTIC: ChannelId = ChannelId::new(4);
pub const WORLD: ChannelId = ChannelId::new(5);
pub const OTHER_ROOT: ChannelId = ChannelId::new(20);

pub const EDITOR: AdminId = AdminId::new(2);

fn channel(id: ChannelId, site_id: SiteId, parent: Option<ChannelId>, name: &str, taxis: i32) -> Channel {
    Channel {
        id,
        site_id,
        parent_id: parent,
        name: name.to_string(),
        taxis,
        list_columns: None,
    }
}

fn admin(id: u32, name: &str) -> Administrator {
    Administrator {
        id: AdminId::new(id),
        user_name: name.to_string(),
    }
}

/// The fixture data.
pub fn snapshot() -> StoreSnapshot {
    let mut main = Site::new(SITE, "main");
    main.url = "http://example.com/".to_string();
    let mut other = Site::new(OTHER_SITE, "other");
    other.root_channel_id = OTHER_ROOT;

    let mut pending = Content::new(ContentId::new(102), SITE, NEWS, "第二条新闻");
    pending.checked = false;
    pending.checked_level = 0;

    StoreSnapshot {
        sites: vec![main, other],
        channels: vec![
            channel(ROOT, SITE, None, "首页", 0),
            channel(NEWS, SITE, Some(ROOT), "新闻", 1),
            channel(NOTICES, SITE, Some(ROOT), "公告", 2),
            channel(DOMESTIC, SITE, Some(NEWS), "国内", 2),
            channel(WORLD, SITE, Some(NEWS), "国际", 1),
            channel(OTHER_ROOT, OTHER_SITE, None, "其他", 0),
        ],
        contents: vec![
            Content::new(ContentId::new(101), SITE, NEWS, "第一条新闻"),
            pending,
            Content::new(ContentId::new(103), SITE, DOMESTIC, "国内要闻"),
        ],
        content_groups: vec![NamedSet {
            site_id: SITE,
            names: vec!["头条".to_string()],
        }],
        content_tags: vec![NamedSet {
            site_id: SITE,
            names: vec!["要闻".to_string()],
        }],
        administrators: vec![
            admin(1, "admin"),
            admin(2, "editor"),
            admin(3, "viewer"),
            admin(4, "librarian"),
        ],
        grants: vec![
            AdminGrants {
                admin_id: AdminId::new(1),
                super_admin: true,
                sites: vec![],
            },
            AdminGrants {
                admin_id: EDITOR,
                super_admin: false,
                sites: vec![SiteGrant {
                    site_id: SITE,
                    site_permissions: vec![SitePermission::ContentsSearch],
                    channel_permissions: vec![],
                    channels: vec![ChannelGrant {
                        channel_id: NEWS,
                        permissions: vec![ChannelPermission::ContentDelete],
                    }],
                }],
            },
            AdminGrants {
                admin_id: AdminId::new(4),
                super_admin: false,
                sites: vec![SiteGrant {
                    site_id: SITE,
                    site_permissions: vec![SitePermission::Library],
                    ..Default::default()
                }],
            },
        ],
        artifacts: [101, 102, 103].into_iter().map(ContentId::new).collect(),
        ..Default::default()
    }
}

/// A store loaded with the fixture.
pub fn store() -> MemoryStore {
    MemoryStore::from_snapshot(snapshot())
}

/// Services backed by `store`, with the fixture's grants.
pub fn services(store: &MemoryStore) -> Services {
    let oracle = Arc::new(GrantTable::new(snapshot().grants));
    Services::memory(store, oracle)
}

pub fn engine(store: &MemoryStore) -> Engine {
    Engine::new(services(store), EngineSettings::default())
}

pub fn engine_with(store: &MemoryStore, settings: EngineSettings) -> Engine {
    Engine::new(services(store), settings)
}

/// A caller acting as the named fixture administrator.
pub fn caller(user_name: &str) -> Caller {
    let snapshot = snapshot();
    let admin = snapshot
        .administrator(user_name)
        .unwrap_or_else(|| panic!("no fixture administrator '{}'", user_name));
    Caller::new(Principal::admin(admin))
}

pub fn anonymous() -> Caller {
    Caller::new(Principal::anonymous())
}
