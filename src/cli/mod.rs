//! cli
//!
//! Command-line interface layer for cascadework.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and initialise logging
//! - Delegate to command handlers
//! - Does NOT decide permissions or mutate content directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, opens the locked store
//! file as a [`crate::store::MemoryStore`] working set and dispatches to the
//! [`crate::engine`]. Mutating commands write the working set back afterwards.

pub mod args;
pub mod commands;

pub use args::{Cli, Command, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::ui::output::Verbosity;

/// Per-invocation settings shared by all command handlers.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    /// Explicit store file, overriding the configured one.
    pub store: Option<PathBuf>,
    /// Administrator user name to act as.
    pub user: Option<String>,
    pub verbosity: Verbosity,
    pub json: bool,
    /// Cancelled on Ctrl-C.
    pub cancel: CancellationToken,
}

impl Context {
    /// Store file to open.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .clone()
            .unwrap_or_else(|| self.config.store_path())
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if let Command::Completion { shell } = cli.command {
        return commands::completion(shell);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    init_tracing(cli.debug, config.log_filter());

    let ctx = Context {
        config,
        store: cli.store.clone(),
        user: cli.user.clone(),
        verbosity: Verbosity::from_quiet(cli.quiet),
        json: cli.json,
        cancel: CancellationToken::new(),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        let cancel = ctx.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
        commands::dispatch(cli.command, &ctx).await
    })
}

/// Install the global tracing subscriber.
///
/// Filter precedence: `--debug` > `RUST_LOG` > configured filter > `warn`.
fn init_tracing(debug: bool, configured: Option<&str>) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .ok()
            .or_else(|| configured.and_then(|f| EnvFilter::try_new(f).ok()))
            .unwrap_or_else(|| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
