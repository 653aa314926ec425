//! library command - Manage the video library

use anyhow::{Context as _, Result};

use super::Session;
use crate::cli::args::{GroupAction, LibraryAction};
use crate::cli::Context;
use crate::engine::library::{
    CreateRequest, DeleteRequest, DownloadRequest, GroupDeleteRequest, GroupRenameRequest,
    GroupRequest, QueryRequest, UpdateRequest,
};
use crate::store::LibraryVideo;
use crate::ui::output;

/// Run a library subcommand.
pub async fn library(ctx: &Context, action: LibraryAction) -> Result<()> {
    let session = Session::open(ctx)?;
    let engine = &session.engine;
    let caller = &session.caller;

    match action {
        LibraryAction::Query {
            site,
            keyword,
            group,
            page,
            per_page,
        } => {
            let request = QueryRequest {
                site_id: site,
                keyword,
                group_id: group,
                page,
                per_page,
            };
            let result = engine.library_query(caller, &request).await?;
            if ctx.json {
                output::json(&result)?;
            } else {
                for video in &result.items {
                    output::print(format_video(video), ctx.verbosity);
                }
                output::print(format!("{} video(s)", result.count), ctx.verbosity);
            }
        }
        LibraryAction::Upload { site, group, file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let request = CreateRequest {
                site_id: site,
                group_id: group,
                file_name,
                bytes,
            };
            let video = engine.library_create(caller, &request).await?;
            session.save()?;
            show_video(ctx, &video)?;
        }
        LibraryAction::Update {
            site,
            id,
            title,
            group,
        } => {
            let request = UpdateRequest {
                site_id: site,
                id,
                title,
                group_id: group,
            };
            let video = engine.library_update(caller, &request).await?;
            session.save()?;
            show_video(ctx, &video)?;
        }
        LibraryAction::Delete { site, id } => {
            engine
                .library_delete(caller, &DeleteRequest { site_id: site, id })
                .await?;
            session.save()?;
            output::print(format!("Deleted video {}.", id), ctx.verbosity);
        }
        LibraryAction::Download { site, id } => {
            let request = DownloadRequest {
                site_id: site,
                library_id: id,
            };
            let url = engine.library_download(caller, &request).await?;
            if ctx.json {
                output::json(&url)?;
            } else {
                println!("{}", url);
            }
        }
        LibraryAction::Group { action } => match action {
            GroupAction::Add { site, name } => {
                let group = engine
                    .library_add_group(caller, &GroupRequest { site_id: site, name })
                    .await?;
                session.save()?;
                if ctx.json {
                    output::json(&group)?;
                } else {
                    output::print(output::row(&[&group.id, &group.name]), ctx.verbosity);
                }
            }
            GroupAction::Rename { site, id, name } => {
                let request = GroupRenameRequest {
                    site_id: site,
                    id,
                    name,
                };
                let group = engine.library_rename_group(caller, &request).await?;
                session.save()?;
                if ctx.json {
                    output::json(&group)?;
                } else {
                    output::print(output::row(&[&group.id, &group.name]), ctx.verbosity);
                }
            }
            GroupAction::Delete { site, id } => {
                engine
                    .library_delete_group(caller, &GroupDeleteRequest { site_id: site, id })
                    .await?;
                session.save()?;
                output::print(format!("Deleted group {}.", id), ctx.verbosity);
            }
        },
    }
    Ok(())
}

fn format_video(video: &LibraryVideo) -> String {
    output::row(&[&video.id, &video.group_id, &video.title, &video.url])
}

fn show_video(ctx: &Context, video: &LibraryVideo) -> Result<()> {
    if ctx.json {
        output::json(video)?;
    } else {
        output::print(format_video(video), ctx.verbosity);
    }
    Ok(())
}
