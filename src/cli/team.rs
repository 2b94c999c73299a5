//! Team CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::{sanitize_single_line, Column, DetailBlock};
use super::session::Session;
use crate::domain::Team;

const STATES_PAGE: u32 = 50;

#[derive(Subcommand)]
pub enum TeamCommands {
    /// List teams
    List,

    /// View a team and its workflow states
    View {
        /// Team key, id or name
        reference: String,
    },
}

pub async fn run(cmd: TeamCommands, session: &Session) -> Result<String> {
    match cmd {
        TeamCommands::List => list(session).await,
        TeamCommands::View { reference } => view(session, &reference).await,
    }
}

fn active(team: &Team) -> String {
    team.is_active().to_string()
}

async fn list(session: &Session) -> Result<String> {
    let columns = vec![
        Column::keyed("id", |t: &Team| t.id.clone()),
        Column::keyed("key", |t: &Team| t.key.clone()),
        Column::keyed("name", |t: &Team| sanitize_single_line(&t.name)),
        Column::keyed("default_assignee", |_: &Team| "-".to_string()),
        Column::keyed("active", active),
    ];
    session.output().check_columns(&columns)?;

    let page = session.api().teams(&session.page()).await?;
    Ok(session
        .output()
        .render_page(&page.page_info, &page.nodes, &columns)?)
}

async fn view(session: &Session, reference: &str) -> Result<String> {
    let team = session.resolver().require_team(reference).await?;
    let states = session.api().team_states(&team.id, STATES_PAGE).await?;

    let block = DetailBlock::new("TEAM_DETAIL")
        .field("TEAM", format!("{} ({})", team.name, team.id))
        .field("KEY", team.key.clone())
        .field(
            "DESCRIPTION",
            sanitize_single_line(team.description.as_deref().unwrap_or("")),
        )
        .field("ACTIVE", active(&team));

    let mut lines = vec!["STATES_START".to_string()];
    lines.extend(
        states
            .nodes
            .iter()
            .map(|s| format!("{}\t{}\t{}", s.id, s.name, s.state_type)),
    );
    lines.push("STATES_END".to_string());

    Ok(format!("{}\n{}\n", block, lines.join("\n")))
}
