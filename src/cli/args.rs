//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this configuration file
//! - `--store <path>`: Use this store file
//! - `--as <user>`: Act as this administrator
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::types::{ChannelId, ContentId, GroupId, LibraryId, SiteId};

/// cascadework - permission-gated channel trees and content recycling
#[derive(Parser, Debug)]
#[command(name = "cw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: $CASCADEWORK_CONFIG or the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Store file (default: store.path from config, else ./cascadework.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Administrator user name to act as
    #[arg(long = "as", global = true, value_name = "USER", env = "CASCADEWORK_USER")]
    pub user: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a site's channel tree with content counts
    #[command(
        name = "tree",
        long_about = "Show a site's channel tree with content counts.\n\n\
            Every channel reachable from the chosen root is listed once, children in \
            display order. Without --reload the result also carries the site URL, \
            group and tag names, check levels, list columns and your permissions in \
            the root channel.\n\n\
            Requires the cms_contentsSearch site permission.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Whole site
    cw --as editor tree --site 1

    # One subtree, tree only
    cw --as editor tree --site 1 --channel 2 --reload --json"
    )]
    Tree {
        /// Site id
        #[arg(long)]
        site: SiteId,

        /// Subtree root (default: the site's root channel)
        #[arg(long)]
        channel: Option<ChannelId>,

        /// Only return the tree
        #[arg(long)]
        reload: bool,
    },

    /// Preview or delete contents of a channel
    #[command(name = "delete")]
    Delete {
        #[command(subcommand)]
        action: DeleteAction,
    },

    /// Manage the video library
    #[command(name = "library")]
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },

    /// Show a site's audit log
    #[command(name = "audit")]
    Audit {
        /// Site id
        #[arg(long)]
        site: SiteId,
    },

    /// List permission keys
    #[command(name = "permissions")]
    Permissions,

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash
    cw completion bash > ~/.local/share/bash-completion/completions/cw

    # Zsh
    cw completion zsh > ~/.zfunc/_cw"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Delete subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DeleteAction {
    /// List the contents that would be deleted, with their check state
    Confirm {
        #[arg(long)]
        site: SiteId,

        #[arg(long)]
        channel: ChannelId,

        /// Comma-separated content ids
        #[arg(long, value_delimiter = ',')]
        ids: Vec<ContentId>,
    },

    /// Move contents to the recycle bin
    #[command(
        long_about = "Move contents to the recycle bin.\n\n\
            Generated files are removed first unless --retain-files is given. The batch \
            is recycled in one step, then one audit entry is written and one change \
            notification is sent.\n\n\
            Requires the cms_contentDelete channel permission."
    )]
    Submit {
        #[arg(long)]
        site: SiteId,

        #[arg(long)]
        channel: ChannelId,

        /// Comma-separated content ids
        #[arg(long, value_delimiter = ',')]
        ids: Vec<ContentId>,

        /// Keep generated files
        #[arg(long)]
        retain_files: bool,
    },
}

/// Library subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum LibraryAction {
    /// List videos
    Query {
        #[arg(long)]
        site: SiteId,

        /// Title substring (case-insensitive)
        #[arg(long)]
        keyword: Option<String>,

        /// Group id (0 = all groups)
        #[arg(long, default_value_t = GroupId::NONE)]
        group: GroupId,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Items per page (0 = configured default)
        #[arg(long, default_value_t = 0)]
        per_page: usize,
    },

    /// Upload a video file
    Upload {
        #[arg(long)]
        site: SiteId,

        #[arg(long, default_value_t = GroupId::NONE)]
        group: GroupId,

        /// Video file
        file: PathBuf,
    },

    /// Change a video's title and group
    Update {
        #[arg(long)]
        site: SiteId,

        #[arg(long)]
        id: LibraryId,

        #[arg(long)]
        title: String,

        #[arg(long, default_value_t = GroupId::NONE)]
        group: GroupId,
    },

    /// Delete a video and its file
    Delete {
        #[arg(long)]
        site: SiteId,

        #[arg(long)]
        id: LibraryId,
    },

    /// Print a video's stored URL
    Download {
        #[arg(long)]
        site: SiteId,

        #[arg(long)]
        id: LibraryId,
    },

    /// Manage library groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },
}

/// Library group subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum GroupAction {
    /// Add a group
    Add {
        #[arg(long)]
        site: SiteId,

        #[arg(long)]
        name: String,
    },

    /// Rename a group
    Rename {
        #[arg(long)]
        site: SiteId,

        #[arg(long)]
        id: GroupId,

        #[arg(long)]
        name: String,
    },

    /// Delete a group; its videos become ungrouped
    Delete {
        #[arg(long)]
        site: SiteId,

        #[arg(long)]
        id: GroupId,
    },
}

/// Shell types for completion generation.
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
