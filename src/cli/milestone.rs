//! Project milestone CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::{sanitize_single_line, Column, DetailBlock};
use super::session::Session;
use crate::domain::{FilterClause, Milestone};
use crate::error::LtuiError;

#[derive(Subcommand)]
pub enum MilestoneCommands {
    /// List project milestones
    List {
        /// Only milestones of this project
        #[arg(long)]
        project: Option<String>,
    },

    /// View a milestone
    View { id: String },
}

pub async fn run(cmd: MilestoneCommands, session: &Session) -> Result<String> {
    match cmd {
        MilestoneCommands::List { project } => list(session, project.as_deref()).await,
        MilestoneCommands::View { id } => view(session, &id).await,
    }
}

async fn list(session: &Session, project: Option<&str>) -> Result<String> {
    let columns = vec![
        Column::keyed("id", |m: &Milestone| m.id.clone()),
        Column::keyed("name", |m: &Milestone| sanitize_single_line(&m.name)),
        Column::keyed("status", |m: &Milestone| m.status().to_string()),
        Column::keyed("targetDate", |m: &Milestone| {
            m.target_date.clone().unwrap_or_default()
        }),
    ];
    session.output().check_columns(&columns)?;

    let mut params = session.page();
    if let Some(reference) = project {
        let project = session.resolver().require_project(reference).await?;
        params = params.filter(
            FilterClause::empty().with_field("project", FilterClause::field_eq("id", project.id)),
        );
    }

    let page = session.api().milestones(&params).await?;
    Ok(session
        .output()
        .render_page(&page.page_info, &page.nodes, &columns)?)
}

async fn view(session: &Session, id: &str) -> Result<String> {
    let milestone = session
        .api()
        .milestone(id)
        .await?
        .ok_or_else(|| LtuiError::reference("Milestone", id))?;

    let block = DetailBlock::new("MILESTONE_DETAIL")
        .field("MILESTONE", format!("{} ({})", milestone.name, milestone.id))
        .field(
            "PROJECT",
            milestone.project.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
        )
        .field("STATUS", milestone.status())
        .field("TARGET_DATE", milestone.target_date.clone().unwrap_or_default());
    Ok(format!("{}\n", block))
}
