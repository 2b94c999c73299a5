//! Roadmap CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::{sanitize_single_line, Column, DetailBlock};
use super::session::Session;
use crate::domain::Roadmap;
use crate::error::LtuiError;

const PROJECTS_PAGE: u32 = 20;

#[derive(Subcommand)]
pub enum RoadmapCommands {
    /// List roadmaps
    List,

    /// View a roadmap and its projects
    View { id: String },
}

pub async fn run(cmd: RoadmapCommands, session: &Session) -> Result<String> {
    match cmd {
        RoadmapCommands::List => list(session).await,
        RoadmapCommands::View { id } => view(session, &id).await,
    }
}

async fn list(session: &Session) -> Result<String> {
    let columns = vec![
        Column::keyed("id", |r: &Roadmap| r.id.clone()),
        Column::keyed("name", |r: &Roadmap| sanitize_single_line(&r.name)),
        Column::keyed("owner", |r: &Roadmap| {
            r.owner
                .as_ref()
                .map(|o| o.name.clone())
                .unwrap_or_else(|| "-".to_string())
        }),
        Column::keyed("url", |r: &Roadmap| r.url.clone().unwrap_or_default()),
    ];
    session.output().check_columns(&columns)?;

    let page = session.api().roadmaps(&session.page()).await?;
    Ok(session
        .output()
        .render_page(&page.page_info, &page.nodes, &columns)?)
}

async fn view(session: &Session, id: &str) -> Result<String> {
    let roadmap = session
        .api()
        .roadmap(id)
        .await?
        .ok_or_else(|| LtuiError::reference("Roadmap", id))?;
    let projects = session.api().roadmap_projects(&roadmap.id, PROJECTS_PAGE).await?;

    let block = DetailBlock::new("ROADMAP_DETAIL")
        .field("ROADMAP", format!("{} ({})", roadmap.name, roadmap.id))
        .field(
            "OWNER",
            roadmap.owner.as_ref().map(|o| o.name.clone()).unwrap_or_default(),
        )
        .field("UPDATED_AT", roadmap.updated_at.clone().unwrap_or_default())
        .field("URL", roadmap.url.clone().unwrap_or_default());

    let mut lines = vec!["PROJECTS_START".to_string()];
    lines.extend(projects.nodes.iter().map(|p| {
        format!(
            "{}\t{}\t{}",
            p.id,
            sanitize_single_line(&p.name),
            p.state.as_deref().unwrap_or("")
        )
    }));
    lines.push("PROJECTS_END".to_string());

    Ok(format!("{}\n{}\n", block, lines.join("\n")))
}
