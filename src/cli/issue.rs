//! Issue CLI commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tokio::task::JoinSet;

use super::output::{sanitize_single_line, truncate_multiline, Column, DetailBlock};
use super::saved::SavedCommands;
use super::session::{read_text_or_path, Session};
use crate::api::{AttachmentInput, IssueInput, RelationType, SortOrder};
use crate::domain::{Issue, NamedRef};
use crate::error::LtuiError;
use crate::resolve::{build_issue_filter, IssueFilterOptions};
use crate::storage::SavedQueryStore;

const COMMENTS_PAGE: u32 = 50;
const HISTORY_PAGE: u32 = 50;

#[derive(Subcommand)]
pub enum IssueCommands {
    #[command(flatten)]
    Remote(IssueAction),

    /// Manage saved issue queries
    #[command(subcommand)]
    Saved(SavedCommands),
}

/// Issue commands that talk to the Linear API
#[derive(Subcommand)]
pub enum IssueAction {
    /// List issues
    List(ListArgs),

    /// View an issue
    View {
        /// Issue id or key (e.g. ENG-42)
        reference: String,

        #[arg(long)]
        include_comments: bool,

        #[arg(long)]
        include_history: bool,

        #[arg(long, default_value_t = 4000)]
        max_description_chars: usize,

        #[arg(long, default_value_t = 500)]
        max_comment_chars: usize,
    },

    /// Create an issue
    Create(CreateArgs),

    /// Update an issue
    Update(UpdateArgs),

    /// Add a comment to an issue
    Comment {
        reference: String,

        /// Comment body or @path
        #[arg(long)]
        body: String,
    },

    /// Attach a link to an issue
    Link {
        reference: String,

        #[arg(long)]
        url: String,

        /// Attachment title (defaults to the URL)
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        branch: Option<String>,

        #[arg(long)]
        commit: Option<String>,
    },

    /// Make an issue the child of another
    Relate {
        /// Child issue id or key
        child: String,

        #[arg(long)]
        parent: String,
    },

    /// Mark an issue as blocked by another issue
    Block {
        reference: String,

        #[arg(long)]
        blocked_by: String,
    },
}

/// Filter flags shared by `issues list` and `issues saved add`
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Team key, id or name
    #[arg(long)]
    pub team: Option<String>,

    /// Project slug, id or name
    #[arg(long)]
    pub project: Option<String>,

    /// Workflow state name or id
    #[arg(long)]
    pub state: Option<String>,

    /// `me`, an email, a name or an id
    #[arg(long)]
    pub assignee: Option<String>,

    /// Required label (repeatable)
    #[arg(long = "label")]
    pub labels: Vec<String>,

    #[arg(long)]
    pub search: Option<String>,

    /// ISO timestamp lower bound on updatedAt
    #[arg(long)]
    pub updated_since: Option<String>,

    /// ISO timestamp lower bound on createdAt
    #[arg(long)]
    pub created_since: Option<String>,
}

impl From<FilterArgs> for IssueFilterOptions {
    fn from(args: FilterArgs) -> Self {
        Self {
            team: args.team,
            project: args.project,
            state: args.state,
            assignee: args.assignee,
            labels: args.labels,
            updated_since: args.updated_since,
            created_since: args.created_since,
            search: args.search,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Saved query to apply underneath explicit filters
    #[arg(long)]
    pub saved: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,

    /// Team key (default from .ltui.toml)
    #[arg(long)]
    pub team: Option<String>,

    /// Project (default from .ltui.toml)
    #[arg(long)]
    pub project: Option<String>,

    /// Description text or @path
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long = "label")]
    pub labels: Vec<String>,

    #[arg(long)]
    pub assignee: Option<String>,

    /// Priority 0-4
    #[arg(long)]
    pub priority: Option<i64>,
}

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    pub reference: String,

    /// Move the issue to another team
    #[arg(long)]
    pub team: Option<String>,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    /// Description text or @path
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    /// Replace all labels with these
    #[arg(long = "label")]
    pub labels: Vec<String>,

    #[arg(long = "add-label")]
    pub add_labels: Vec<String>,

    #[arg(long = "remove-label")]
    pub remove_labels: Vec<String>,

    #[arg(long)]
    pub assignee: Option<String>,

    #[arg(long)]
    pub priority: Option<i64>,

    #[arg(long)]
    pub estimate: Option<i64>,

    /// Due date (ISO)
    #[arg(long)]
    pub due: Option<String>,
}

pub async fn run(cmd: IssueAction, session: &Session, queries: &SavedQueryStore) -> Result<String> {
    match cmd {
        IssueAction::List(args) => list(session, queries, args).await,
        IssueAction::View {
            reference,
            include_comments,
            include_history,
            max_description_chars,
            max_comment_chars,
        } => {
            view(
                session,
                &reference,
                ViewOptions {
                    include_comments,
                    include_history,
                    max_description_chars,
                    max_comment_chars,
                },
            )
            .await
        }
        IssueAction::Create(args) => create(session, args).await,
        IssueAction::Update(args) => update(session, args).await,
        IssueAction::Comment { reference, body } => comment(session, &reference, &body).await,
        IssueAction::Link {
            reference,
            url,
            title,
            branch,
            commit,
        } => link(session, &reference, url, title, branch, commit).await,
        IssueAction::Relate { child, parent } => relate(session, &child, &parent).await,
        IssueAction::Block {
            reference,
            blocked_by,
        } => block(session, &reference, &blocked_by).await,
    }
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn list_columns() -> Vec<Column<Issue>> {
    vec![
        Column::keyed("id", |i: &Issue| i.id.clone()),
        Column::keyed("key", |i: &Issue| {
            i.team.as_ref().map(|t| t.key.clone()).unwrap_or_default()
        }),
        Column::keyed("identifier", |i: &Issue| i.identifier.clone()),
        Column::keyed("title", |i: &Issue| sanitize_single_line(&i.title)),
        Column::keyed("state", |i: &Issue| {
            i.state.as_ref().map(|s| s.name.clone()).unwrap_or_default()
        }),
        Column::keyed("priority", |i: &Issue| i.priority_text()),
        Column::keyed("assignee", |i: &Issue| {
            or_dash(i.assignee.as_ref().map(|a| a.name.as_str()))
        }),
        Column::keyed("labels", |i: &Issue| i.label_names().join(",")),
        Column::keyed("project", |i: &Issue| {
            or_dash(i.project.as_ref().map(|p| p.name.as_str()))
        }),
        Column::keyed("updatedAt", |i: &Issue| i.updated_at.clone().unwrap_or_default()),
    ]
}

async fn list(session: &Session, queries: &SavedQueryStore, args: ListArgs) -> Result<String> {
    let columns = list_columns();
    session.output().check_columns(&columns)?;

    let mut options = IssueFilterOptions::from(args.filters);
    if let Some(name) = &args.saved {
        let saved = queries
            .get(name)
            .ok_or_else(|| LtuiError::NotFound(format!("Saved query '{}' not found", name)))?;
        options = options.merged_with(&saved);
    }

    let params = session
        .page()
        .filter(build_issue_filter(&options))
        .sort("updatedAt", SortOrder::Descending);

    let (issues, page_info) = match &options.search {
        Some(term) => {
            let hits = session.api().search_issues(term, &params).await?;
            (refetch(session, hits.nodes).await?, hits.page_info)
        }
        None => {
            let page = session.api().issues(&params).await?;
            (page.nodes, page.page_info)
        }
    };

    Ok(session
        .output()
        .render_page(&page_info, &issues, &columns)?)
}

/// Loads full records for search hits, keeping hit order
async fn refetch(session: &Session, hits: Vec<Issue>) -> Result<Vec<Issue>> {
    let mut tasks = JoinSet::new();
    for (index, hit) in hits.iter().enumerate() {
        let api = session.api_handle();
        let id = hit.id.clone();
        tasks.spawn(async move { (index, api.issue(&id).await) });
    }

    let mut slots: Vec<Option<Issue>> = vec![None; hits.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.context("Issue fetch task failed")?;
        slots[index] = result?;
    }

    Ok(hits
        .into_iter()
        .zip(slots)
        .map(|(hit, full)| full.unwrap_or(hit))
        .collect())
}

struct ViewOptions {
    include_comments: bool,
    include_history: bool,
    max_description_chars: usize,
    max_comment_chars: usize,
}

async fn view(session: &Session, reference: &str, options: ViewOptions) -> Result<String> {
    let issue = session.resolver().require_issue(reference).await?;
    let api = session.api();

    let (comments, history) = tokio::try_join!(
        async {
            if options.include_comments {
                api.issue_comments(&issue.id, COMMENTS_PAGE).await.map(Some)
            } else {
                Ok(None)
            }
        },
        async {
            if options.include_history {
                api.issue_history(&issue.id, HISTORY_PAGE).await.map(Some)
            } else {
                Ok(None)
            }
        },
    )?;

    let block = DetailBlock::new("ISSUE_DETAIL")
        .field("ISSUE", format!("{} ({})", issue.identifier, issue.id))
        .field("TITLE", issue.title.clone())
        .field("STATE", name_of(&issue.state))
        .field("PRIORITY", issue.priority_text())
        .field("TEAM", issue.team.as_ref().map(|t| t.key.clone()).unwrap_or_default())
        .field("PROJECT", name_of(&issue.project))
        .field("ASSIGNEE", name_of(&issue.assignee))
        .field("LABELS", issue.label_names().join(","))
        .field("CREATED_AT", issue.created_at.clone().unwrap_or_default())
        .field("UPDATED_AT", issue.updated_at.clone().unwrap_or_default());

    let description = truncate_multiline(
        issue.description.as_deref().unwrap_or(""),
        options.max_description_chars,
    );
    let mut out = format!(
        "{}\nDESCRIPTION_START\n{}\nDESCRIPTION_END\n",
        block, description.text
    );
    if description.truncated {
        out.push_str("DESCRIPTION_TRUNCATED: true\n");
    }

    if let Some(comments) = comments {
        let mut lines = vec!["COMMENTS_START".to_string()];
        for comment in &comments.nodes {
            let body = truncate_multiline(&comment.body, options.max_comment_chars);
            lines.push(
                [
                    comment.id.clone(),
                    name_of(&comment.user),
                    comment.created_at.clone().unwrap_or_default(),
                    sanitize_single_line(&body.text),
                ]
                .join("\t"),
            );
            if body.truncated {
                lines.push(format!("COMMENT_TRUNCATED: {}", comment.id));
            }
        }
        lines.push("COMMENTS_END".to_string());
        out.push_str(&lines.join("\n"));
        out.push('\n');
    }

    if let Some(history) = history {
        let mut lines = vec!["HISTORY_START".to_string()];
        for entry in &history.nodes {
            lines.push(
                [
                    entry.created_at.clone().unwrap_or_default(),
                    sanitize_single_line(entry.actor_name()),
                    entry.change_type().to_string(),
                    sanitize_single_line(&entry.from_value()),
                    sanitize_single_line(&entry.to_value()),
                ]
                .join("\t"),
            );
        }
        lines.push("HISTORY_END".to_string());
        out.push_str(&lines.join("\n"));
        out.push('\n');
    }

    Ok(out)
}

fn name_of(named: &Option<NamedRef>) -> String {
    named.as_ref().map(|n| n.name.clone()).unwrap_or_default()
}

/// Shared block for `ISSUE_CREATED` / `ISSUE_UPDATED`
fn summary_block(header: &str, issue: &Issue) -> DetailBlock {
    DetailBlock::new(header)
        .field("ISSUE", format!("{} ({})", issue.identifier, issue.id))
        .field("TITLE", issue.title.clone())
        .field("STATE", name_of(&issue.state))
        .field("PRIORITY", issue.priority_text())
        .field("TEAM", issue.team.as_ref().map(|t| t.key.clone()).unwrap_or_default())
        .field("PROJECT", name_of(&issue.project))
        .field("ASSIGNEE", name_of(&issue.assignee))
        .field("LABELS", issue.label_names().join(","))
}

async fn create(session: &Session, args: CreateArgs) -> Result<String> {
    let defaults = session.defaults();
    let resolver = session.resolver();

    let team_ref = args
        .team
        .clone()
        .or_else(|| defaults.team_key.clone())
        .ok_or_else(|| {
            LtuiError::Validation(
                "Team is required to create an issue (use --team or configure .ltui.toml)"
                    .to_string(),
            )
        })?;
    let project_ref = args.project.clone().or_else(|| defaults.project_id.clone());
    let assignee_ref = args.assignee.clone().or_else(|| defaults.default_assignee.clone());

    let (team, project, assignee_id) = tokio::try_join!(
        resolver.require_team(&team_ref),
        async {
            match project_ref.as_deref() {
                Some(r) => resolver.require_project(r).await.map(Some),
                None => Ok(None),
            }
        },
        async {
            match assignee_ref.as_deref() {
                Some(r) => resolver.require_assignee(r).await.map(Some),
                None => Ok(None),
            }
        },
    )?;

    let description = args
        .description
        .as_deref()
        .map(|value| read_text_or_path(value, session.project_dir()))
        .transpose()?;

    let state_id = match args.state.as_ref().or(defaults.default_issue_state.as_ref()) {
        Some(state) => Some(resolver.require_workflow_state(&team.id, state).await?.id),
        None => None,
    };

    let label_names: Vec<String> = defaults
        .default_labels
        .iter()
        .chain(args.labels.iter())
        .cloned()
        .collect();
    let label_ids = resolver.label_ids(&team.id, &label_names).await?;

    let input = IssueInput {
        team_id: Some(team.id.clone()),
        project_id: project.map(|p| p.id),
        title: Some(args.title),
        description,
        state_id,
        label_ids: (!label_ids.is_empty()).then_some(label_ids),
        assignee_id,
        priority: args.priority,
        ..Default::default()
    };

    let issue = session
        .api()
        .create_issue(&input)
        .await?
        .ok_or_else(|| LtuiError::Api("Failed to load created issue".to_string()))?;
    Ok(format!("{}\n", summary_block("ISSUE_CREATED", &issue)))
}

async fn update(session: &Session, args: UpdateArgs) -> Result<String> {
    let resolver = session.resolver();

    let (issue, team, project, assignee_id) = tokio::try_join!(
        resolver.require_issue(&args.reference),
        async {
            match args.team.as_deref() {
                Some(r) => resolver.require_team(r).await.map(Some),
                None => Ok(None),
            }
        },
        async {
            match args.project.as_deref() {
                Some(r) => resolver.require_project(r).await.map(Some),
                None => Ok(None),
            }
        },
        async {
            match args.assignee.as_deref() {
                Some(r) => resolver.require_assignee(r).await.map(Some),
                None => Ok(None),
            }
        },
    )?;

    let team_id = team
        .as_ref()
        .map(|t| t.id.clone())
        .or_else(|| issue.team.as_ref().map(|t| t.id.clone()));

    let mut input = IssueInput {
        team_id: team.map(|t| t.id),
        project_id: project.map(|p| p.id),
        title: args.title.clone(),
        description: args
            .description
            .as_deref()
            .map(|value| read_text_or_path(value, session.project_dir()))
            .transpose()?,
        assignee_id,
        priority: args.priority,
        estimate: args.estimate,
        due_date: args.due.clone(),
        ..Default::default()
    };

    if let Some(state) = &args.state {
        let team_id = team_id.as_deref().ok_or_else(|| {
            LtuiError::Validation("Cannot change state without team context".to_string())
        })?;
        input.state_id = Some(resolver.require_workflow_state(team_id, state).await?.id);
    }

    if !args.labels.is_empty() || !args.add_labels.is_empty() || !args.remove_labels.is_empty() {
        let team_id = team_id.as_deref().ok_or_else(|| {
            LtuiError::Validation("Cannot modify labels without determining the team".to_string())
        })?;
        input.label_ids = Some(next_labels(session, &issue, team_id, &args).await?);
    }

    if input.is_empty() {
        return Err(LtuiError::Validation("No updates specified".to_string()).into());
    }

    session.api().update_issue(&issue.id, &input).await?;
    let updated = session
        .api()
        .issue(&issue.id)
        .await?
        .ok_or_else(|| LtuiError::Api("Failed to load updated issue".to_string()))?;
    Ok(format!("{}\n", summary_block("ISSUE_UPDATED", &updated)))
}

/// Label ids after applying replace, then remove, then add
async fn next_labels(
    session: &Session,
    issue: &Issue,
    team_id: &str,
    args: &UpdateArgs,
) -> Result<Vec<String>> {
    let resolver = session.resolver();
    let current = issue.label_refs();

    let mut working: Vec<String> = if args.labels.is_empty() {
        current.iter().map(|l| l.id.clone()).collect()
    } else {
        resolver.label_ids(team_id, &args.labels).await?
    };

    for name in &args.remove_labels {
        let label = current.iter().find(|l| &l.name == name).ok_or_else(|| {
            LtuiError::NotFound(format!("Label '{}' is not on the issue", name))
        })?;
        working.retain(|id| id != &label.id);
    }

    for id in resolver.label_ids(team_id, &args.add_labels).await? {
        if !working.contains(&id) {
            working.push(id);
        }
    }

    Ok(working)
}

async fn comment(session: &Session, reference: &str, body: &str) -> Result<String> {
    let issue = session.resolver().require_issue(reference).await?;
    let body = read_text_or_path(body, session.project_dir())?;
    let comment = session.api().create_comment(&issue.id, &body).await?;

    let block = DetailBlock::new("COMMENT_CREATED")
        .field("COMMENT", comment.as_ref().map(|c| c.id.clone()).unwrap_or_default())
        .field(
            "AUTHOR",
            comment.as_ref().map(|c| name_of(&c.user)).unwrap_or_default(),
        )
        .field(
            "CREATED_AT",
            comment
                .as_ref()
                .and_then(|c| c.created_at.clone())
                .unwrap_or_default(),
        )
        .field("ISSUE", issue.display_ref());
    Ok(format!("{}\n", block))
}

async fn link(
    session: &Session,
    reference: &str,
    url: String,
    title: Option<String>,
    branch: Option<String>,
    commit: Option<String>,
) -> Result<String> {
    let issue = session.resolver().require_issue(reference).await?;

    let mut input = AttachmentInput {
        issue_id: issue.id.clone(),
        title: title.unwrap_or_else(|| url.clone()),
        url,
        ..Default::default()
    };
    if branch.is_some() || commit.is_some() {
        let mut metadata = std::collections::BTreeMap::new();
        let mut subtitle = Vec::new();
        if let Some(branch) = &branch {
            metadata.insert("branch".to_string(), branch.clone());
            subtitle.push(format!("branch:{}", branch));
        }
        if let Some(commit) = &commit {
            metadata.insert("commit".to_string(), commit.clone());
            subtitle.push(format!("commit:{}", commit));
        }
        input.metadata = Some(metadata);
        input.subtitle = Some(subtitle.join(" "));
    }

    let attachment = session.api().create_attachment(&input).await?;
    let block = DetailBlock::new("LINK_ATTACHED")
        .field(
            "ATTACHMENT",
            attachment.as_ref().map(|a| a.id.clone()).unwrap_or_default(),
        )
        .field(
            "TITLE",
            attachment.as_ref().map(|a| a.title.clone()).unwrap_or_default(),
        )
        .field(
            "URL",
            attachment.as_ref().map(|a| a.url.clone()).unwrap_or_default(),
        )
        .field("ISSUE", issue.display_ref())
        .field("BRANCH", branch.unwrap_or_default())
        .field("COMMIT", commit.unwrap_or_default());
    Ok(format!("{}\n", block))
}

async fn relate(session: &Session, child_ref: &str, parent_ref: &str) -> Result<String> {
    let resolver = session.resolver();
    let (child, parent) =
        tokio::try_join!(resolver.issue(child_ref), resolver.issue(parent_ref))?;
    let (Some(child), Some(parent)) = (child, parent) else {
        return Err(
            LtuiError::NotFound("Could not resolve child or parent issue".to_string()).into(),
        );
    };

    let input = IssueInput {
        parent_id: Some(parent.id.clone()),
        ..Default::default()
    };
    session.api().update_issue(&child.id, &input).await?;

    let block = DetailBlock::new("RELATIONSHIP_UPDATED")
        .field("CHILD", child.display_ref())
        .field("PARENT", parent.display_ref())
        .field("RELATION", "parent-child");
    Ok(format!("{}\n", block))
}

async fn block(session: &Session, reference: &str, blocker_ref: &str) -> Result<String> {
    let resolver = session.resolver();
    let (issue, blocker) =
        tokio::try_join!(resolver.issue(reference), resolver.issue(blocker_ref))?;
    let (Some(issue), Some(blocker)) = (issue, blocker) else {
        return Err(
            LtuiError::NotFound("Could not resolve issue or blocker".to_string()).into(),
        );
    };

    // The blocker is the relation's subject
    session
        .api()
        .create_issue_relation(&blocker.id, &issue.id, RelationType::Blocks)
        .await?;

    let block = DetailBlock::new("RELATIONSHIP_UPDATED")
        .field("ISSUE", issue.display_ref())
        .field("BLOCKED_BY", blocker.display_ref())
        .field("RELATION", "blocks");
    Ok(format!("{}\n", block))
}
