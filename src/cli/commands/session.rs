//! Store session shared by the command handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};

use crate::auth::{GrantTable, Principal};
use crate::cli::Context;
use crate::engine::{Caller, Engine, EngineSettings, Services};
use crate::store::media::FileMediaStore;
use crate::store::snapshot::StoreFile;
use crate::store::MemoryStore;

/// Directory, next to the store file, holding uploaded media.
const MEDIA_DIR: &str = "media";

/// An open, locked store file loaded into an engine.
///
/// The lock is held until the session is dropped.
pub struct Session {
    file: StoreFile,
    store: MemoryStore,
    pub engine: Engine,
    pub caller: Caller,
}

impl Session {
    /// Open the store, resolve the acting administrator and build the engine.
    ///
    /// Without `--as` the caller is anonymous, which every gated command
    /// rejects as unauthenticated.
    pub fn open(ctx: &Context) -> Result<Self> {
        let path = ctx.store_path();
        let file = StoreFile::open(&path)
            .with_context(|| format!("failed to open store {}", path.display()))?;
        let snapshot = file
            .load()
            .with_context(|| format!("failed to read store {}", path.display()))?;

        let principal = match ctx.user.as_deref() {
            Some(name) => snapshot
                .administrator(name)
                .map(Principal::admin)
                .ok_or_else(|| anyhow!("unknown administrator '{}'", name))?,
            None => Principal::anonymous(),
        };

        let oracle = Arc::new(GrantTable::new(snapshot.grants.clone()));
        let media_root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .join(MEDIA_DIR);

        let store = MemoryStore::from_snapshot(snapshot);
        let services =
            Services::memory(&store, oracle).with_media(Arc::new(FileMediaStore::new(media_root)));
        let engine = Engine::new(services, EngineSettings::from_config(&ctx.config));
        let caller = Caller::with_cancel(principal, ctx.cancel.clone());

        tracing::debug!(store = %path.display(), user = ?ctx.user, "opened session");
        Ok(Self {
            file,
            store,
            engine,
            caller,
        })
    }

    /// Write the working set back to the store file.
    pub fn save(&self) -> Result<()> {
        let snapshot = self.store.snapshot()?;
        self.file
            .save(&snapshot)
            .with_context(|| format!("failed to write store {}", self.file.path().display()))
    }
}
