//! Project CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::{sanitize_single_line, Column, DetailBlock};
use super::session::Session;
use crate::domain::{FilterClause, Project};
use crate::error::LtuiError;
use crate::storage::ProjectConfig;

const MILESTONES_PAGE: u32 = 20;

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects
    List {
        /// Only projects accessible to this team
        #[arg(long)]
        team: Option<String>,

        /// Project state (e.g. started, planned)
        #[arg(long)]
        state: Option<String>,
    },

    /// View a project with issue counts and milestones
    View {
        /// Project slug, id or name
        reference: String,
    },

    /// Write .ltui.toml defaults for the current directory
    ///
    /// The global --profile, when given, is recorded as the directory's
    /// profile.
    Align {
        reference: String,

        /// Team to record (defaults to the project's first team)
        #[arg(long)]
        team: Option<String>,

        /// Default state for new issues
        #[arg(long)]
        state: Option<String>,

        /// Default labels (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Default assignee reference
        #[arg(long)]
        assignee: Option<String>,
    },
}

pub async fn run(cmd: ProjectCommands, session: &Session, profile: Option<&str>) -> Result<String> {
    match cmd {
        ProjectCommands::List { team, state } => list(session, team.as_deref(), state).await,
        ProjectCommands::View { reference } => view(session, &reference).await,
        ProjectCommands::Align {
            reference,
            team,
            state,
            labels,
            assignee,
        } => {
            let options = AlignOptions {
                profile: profile.map(str::to_string),
                team,
                state,
                labels,
                assignee,
            };
            align(session, &reference, options).await
        }
    }
}

async fn list(session: &Session, team: Option<&str>, state: Option<String>) -> Result<String> {
    let columns = vec![
        Column::keyed("id", |p: &Project| p.id.clone()),
        Column::keyed("name", |p: &Project| sanitize_single_line(&p.name)),
        Column::keyed("state", |p: &Project| p.state.clone().unwrap_or_default()),
        Column::keyed("status", |p: &Project| {
            p.status.as_ref().map(|s| s.name.clone()).unwrap_or_default()
        }),
        Column::new("targetDate", "target_date", |p: &Project| {
            p.target_date.clone().unwrap_or_default()
        }),
    ];
    session.output().check_columns(&columns)?;

    let mut filter = FilterClause::empty();
    if let Some(reference) = team {
        let team = session.resolver().require_team(reference).await?;
        filter = filter.with_field(
            "accessibleTeams",
            FilterClause::some(FilterClause::field_eq("id", team.id)),
        );
    }
    if let Some(state) = state {
        filter = filter.with_field("state", FilterClause::eq(state));
    }

    let page = session
        .api()
        .projects(&session.page().filter(filter))
        .await?;
    Ok(session
        .output()
        .render_page(&page.page_info, &page.nodes, &columns)?)
}

fn last_count(history: &[i64]) -> i64 {
    history.last().copied().unwrap_or(0)
}

async fn view(session: &Session, reference: &str) -> Result<String> {
    let project = session.resolver().require_project(reference).await?;
    let milestones = session
        .api()
        .project_milestones(&project.id, MILESTONES_PAGE)
        .await?;

    let block = DetailBlock::new("PROJECT_DETAIL")
        .field("PROJECT", format!("{} ({})", project.name, project.id))
        .field(
            "STATUS",
            project.status.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
        )
        .field("STATE", project.state.clone().unwrap_or_default())
        .field("TARGET_DATE", project.target_date.clone().unwrap_or_default())
        .field("URL", project.url.clone().unwrap_or_default())
        .field("HEALTH", project.health.clone().unwrap_or_default());

    let total = last_count(&project.issue_count_history);
    let completed = last_count(&project.completed_issue_count_history);
    let summary = [
        "ISSUES_SUMMARY_START".to_string(),
        format!("TOTAL: {}", total),
        format!("COMPLETED: {}", completed),
        format!("OPEN: {}", (total - completed).max(0)),
        format!("PROGRESS: {:.2}", project.progress.unwrap_or(0.0)),
        "ISSUES_SUMMARY_END".to_string(),
    ];

    let mut lines = vec!["MILESTONES_START".to_string()];
    lines.extend(milestones.nodes.iter().map(|m| {
        format!(
            "{}\t{}\t{}",
            m.id,
            sanitize_single_line(&m.name),
            m.target_date.as_deref().unwrap_or("")
        )
    }));
    lines.push("MILESTONES_END".to_string());

    Ok(format!(
        "{}\n{}\n{}\n",
        block,
        summary.join("\n"),
        lines.join("\n")
    ))
}

#[derive(Debug, Default)]
struct AlignOptions {
    profile: Option<String>,
    team: Option<String>,
    state: Option<String>,
    labels: Vec<String>,
    assignee: Option<String>,
}

async fn align(session: &Session, reference: &str, options: AlignOptions) -> Result<String> {
    let resolver = session.resolver();
    let project = resolver.require_project(reference).await?;

    let team_key = match options.team.as_deref() {
        Some(team) => resolver.require_team(team).await?.key,
        None => session
            .api()
            .project_teams(&project.id, 1)
            .await?
            .first()
            .map(|team| team.key)
            .ok_or_else(|| {
                LtuiError::NotFound("Project has no associated teams to align with".to_string())
            })?,
    };

    let existing = ProjectConfig::load(session.project_dir());
    let profile = options
        .profile
        .or(existing.profile)
        .or_else(|| Some(session.config().profile_name.clone()))
        .filter(|p| !p.is_empty());
    let config = ProjectConfig {
        profile,
        team_key: Some(team_key),
        project_id: Some(project.id),
        default_issue_state: options.state.or(existing.default_issue_state),
        default_labels: if options.labels.is_empty() {
            existing.default_labels
        } else {
            options.labels
        },
        default_assignee: options.assignee.or(existing.default_assignee),
    };
    config.save(session.project_dir())?;

    let block = DetailBlock::new("PROJECT_ALIGNED")
        .field("PROFILE", config.profile.clone().unwrap_or_default())
        .field("TEAM", config.team_key.clone().unwrap_or_default())
        .field("PROJECT_ID", config.project_id.clone().unwrap_or_default())
        .field(
            "DEFAULT_STATE",
            config.default_issue_state.clone().unwrap_or_default(),
        )
        .field("DEFAULT_LABELS", config.default_labels.join(","))
        .field(
            "DEFAULT_ASSIGNEE",
            config.default_assignee.clone().unwrap_or_default(),
        );
    Ok(format!("{}\n", block))
}
