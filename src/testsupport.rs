//! In-memory [`LinearApi`] for unit tests
//!
//! [`MockApi`] evaluates the filter trees it receives against its own
//! entities, ordering `or` matches by the first branch that matched, and
//! counts every call so tests can assert on remote traffic.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::{
    ApiError, AttachmentInput, Connection, IssueInput, LinearApi, ListParams, PageInfo,
    RelationType,
};
use crate::domain::{
    Attachment, Comment, Cycle, Document, FilterClause, HistoryEntry, Issue, Label, LabelNodes,
    Milestone, NamedRef, Notification, Project, Roadmap, Team, TeamRef, User, WorkflowState,
};

pub const ENG_TEAM_ID: &str = "team-1";

#[derive(Default)]
pub struct MockApi {
    viewer: User,
    teams: Vec<Team>,
    states: Vec<(String, WorkflowState)>,
    labels: Vec<(String, Label)>,
    users: Vec<User>,
    projects: Vec<(Project, Vec<String>)>,
    milestones: Vec<(String, Milestone)>,
    cycles: Vec<(String, Cycle)>,
    documents: Vec<Document>,
    roadmaps: Vec<(Roadmap, Vec<String>)>,
    notifications: Vec<Notification>,
    history: Vec<(String, HistoryEntry)>,
    issues: Mutex<Vec<Issue>>,
    comments: Mutex<Vec<(String, Comment)>>,
    pub attachments: Mutex<Vec<AttachmentInput>>,
    pub relations: Mutex<Vec<(String, String, RelationType)>>,
    pub updates: Mutex<Vec<(String, IssueInput)>>,
    calls: Mutex<BTreeMap<&'static str, usize>>,
    filters: Mutex<BTreeMap<&'static str, Value>>,
}

fn named(id: &str, name: &str) -> NamedRef {
    NamedRef {
        id: id.to_string(),
        name: name.to_string(),
    }
}

/// The shared fixture workspace
///
/// Team ENG (`team-1`) with states Todo/In Progress/Done and labels
/// bug/backend; users Alice (viewer) and Bob; project "API Revamp"; issues
/// ENG-1 and ENG-2; one document, one cycle and one milestone; roadmap
/// "2024 Plan" over the project; two notifications, the first unread.
pub fn fixture() -> MockApi {
    let alice = User {
        id: "user-alice".to_string(),
        name: "Alice".to_string(),
        email: Some("alice@example.com".to_string()),
        display_name: Some("alice".to_string()),
        active: Some(true),
    };
    let bob = User {
        id: "user-bob".to_string(),
        name: "Bob".to_string(),
        email: Some("bob@example.com".to_string()),
        display_name: Some("bob".to_string()),
        active: Some(false),
    };

    let eng_ref = TeamRef {
        id: ENG_TEAM_ID.to_string(),
        key: "ENG".to_string(),
    };

    let issue_one = Issue {
        id: "issue-1".to_string(),
        identifier: "ENG-1".to_string(),
        title: "Fix bug".to_string(),
        number: 1,
        description: Some("Line one\nLine two".to_string()),
        priority: Some(2.0),
        created_at: Some("2024-01-01T00:00:00.000Z".to_string()),
        updated_at: Some("2024-01-03T00:00:00.000Z".to_string()),
        state: Some(named("state-todo", "Todo")),
        team: Some(eng_ref.clone()),
        project: Some(named("proj-1", "API Revamp")),
        assignee: Some(named("user-alice", "Alice")),
        labels: Some(LabelNodes {
            nodes: vec![named("label-bug", "bug")],
        }),
    };
    let issue_two = Issue {
        id: "issue-2".to_string(),
        identifier: "ENG-2".to_string(),
        title: "Add endpoint".to_string(),
        number: 2,
        priority: Some(3.0),
        created_at: Some("2024-01-02T00:00:00.000Z".to_string()),
        updated_at: Some("2024-01-02T12:00:00.000Z".to_string()),
        state: Some(named("state-progress", "In Progress")),
        team: Some(eng_ref),
        labels: Some(LabelNodes::default()),
        ..Default::default()
    };

    MockApi {
        viewer: alice.clone(),
        users: vec![alice, bob],
        ..Default::default()
    }
    .with_team(Team {
        id: ENG_TEAM_ID.to_string(),
        key: "ENG".to_string(),
        name: "Engineering".to_string(),
        description: Some("Product engineering".to_string()),
        archived_at: None,
    })
    .with_state(ENG_TEAM_ID, "state-todo", "Todo", "unstarted")
    .with_state(ENG_TEAM_ID, "state-progress", "In Progress", "started")
    .with_state(ENG_TEAM_ID, "state-done", "Done", "completed")
    .with_label(ENG_TEAM_ID, "label-bug", "bug")
    .with_label(ENG_TEAM_ID, "label-backend", "backend")
    .with_project(
        Project {
            id: "proj-1".to_string(),
            name: "API Revamp".to_string(),
            slug_id: "api-revamp".to_string(),
            state: Some("started".to_string()),
            status: Some(named("status-1", "On Track")),
            target_date: Some("2024-03-01".to_string()),
            url: Some("https://linear.app/acme/project/api-revamp".to_string()),
            health: Some("onTrack".to_string()),
            progress: Some(0.5),
            issue_count_history: vec![2, 4],
            completed_issue_count_history: vec![0, 1],
        },
        &[ENG_TEAM_ID],
    )
    .with_milestone("proj-1", "ms-1", "Beta", Some("2024-02-15"))
    .with_issue(issue_one)
    .with_issue(issue_two)
    .with_comment(
        "issue-1",
        Comment {
            id: "comment-1".to_string(),
            body: "Looks good\nShip it".to_string(),
            created_at: Some("2024-01-04T00:00:00.000Z".to_string()),
            user: Some(named("user-bob", "Bob")),
        },
    )
    .with_history(
        "issue-1",
        HistoryEntry {
            id: "history-1".to_string(),
            created_at: Some("2024-01-02T00:00:00.000Z".to_string()),
            actor: Some(named("user-alice", "Alice")),
            from_state: Some(named("state-todo", "Todo")),
            to_state: Some(named("state-progress", "In Progress")),
            ..Default::default()
        },
    )
    .with_cycle(
        ENG_TEAM_ID,
        Cycle {
            id: "cycle-1".to_string(),
            number: Some(1),
            name: Some("Sprint 1".to_string()),
            starts_at: Some("2024-01-01".to_string()),
            ends_at: Some("2024-01-14".to_string()),
            completed_at: None,
        },
    )
    .with_document(Document {
        id: "doc-1".to_string(),
        title: "Runbook".to_string(),
        content: Some("Restart the service".to_string()),
        url: Some("https://linear.app/acme/document/runbook".to_string()),
        created_at: Some("2024-01-01T00:00:00.000Z".to_string()),
        updated_at: Some("2024-01-05T00:00:00.000Z".to_string()),
        project: Some(named("proj-1", "API Revamp")),
        creator: Some(named("user-bob", "Bob")),
    })
    .with_roadmap(
        Roadmap {
            id: "roadmap-1".to_string(),
            name: "2024 Plan".to_string(),
            url: Some("https://linear.app/acme/roadmap/2024-plan".to_string()),
            updated_at: Some("2024-01-06T00:00:00.000Z".to_string()),
            owner: Some(named("user-alice", "Alice")),
        },
        &["proj-1"],
    )
    .with_notification(Notification {
        id: "notif-1".to_string(),
        kind: "issueAssignedToYou".to_string(),
        read_at: None,
        created_at: Some("2024-01-05T00:00:00.000Z".to_string()),
    })
    .with_notification(Notification {
        id: "notif-2".to_string(),
        kind: "issueCommentMention".to_string(),
        read_at: Some("2024-01-06T00:00:00.000Z".to_string()),
        created_at: Some("2024-01-04T00:00:00.000Z".to_string()),
    })
}

impl MockApi {
    pub fn with_team(mut self, team: Team) -> Self {
        self.teams.push(team);
        self
    }

    pub fn with_state(mut self, team_id: &str, id: &str, name: &str, state_type: &str) -> Self {
        self.states.push((
            team_id.to_string(),
            WorkflowState {
                id: id.to_string(),
                name: name.to_string(),
                state_type: state_type.to_string(),
            },
        ));
        self
    }

    pub fn with_label(mut self, team_id: &str, id: &str, name: &str) -> Self {
        self.labels.push((
            team_id.to_string(),
            Label {
                id: id.to_string(),
                name: name.to_string(),
                color: Some("#ff0000".to_string()),
                ..Default::default()
            },
        ));
        self
    }

    pub fn with_project(mut self, project: Project, team_ids: &[&str]) -> Self {
        self.projects
            .push((project, team_ids.iter().map(|id| id.to_string()).collect()));
        self
    }

    pub fn with_milestone(
        mut self,
        project_id: &str,
        id: &str,
        name: &str,
        target_date: Option<&str>,
    ) -> Self {
        self.milestones.push((
            project_id.to_string(),
            Milestone {
                id: id.to_string(),
                name: name.to_string(),
                target_date: target_date.map(str::to_string),
                archived_at: None,
                project: self
                    .projects
                    .iter()
                    .find(|(p, _)| p.id == project_id)
                    .map(|(p, _)| named(&p.id, &p.name)),
            },
        ));
        self
    }

    pub fn with_roadmap(mut self, roadmap: Roadmap, project_ids: &[&str]) -> Self {
        self.roadmaps
            .push((roadmap, project_ids.iter().map(|id| id.to_string()).collect()));
        self
    }

    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }

    pub fn with_issue(self, issue: Issue) -> Self {
        self.issues.lock().unwrap().push(issue);
        self
    }

    pub fn with_comment(self, issue_id: &str, comment: Comment) -> Self {
        self.comments
            .lock()
            .unwrap()
            .push((issue_id.to_string(), comment));
        self
    }

    pub fn with_history(mut self, issue_id: &str, entry: HistoryEntry) -> Self {
        self.history.push((issue_id.to_string(), entry));
        self
    }

    pub fn with_cycle(mut self, team_id: &str, cycle: Cycle) -> Self {
        self.cycles.push((team_id.to_string(), cycle));
        self
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }

    /// Calls made to one trait method
    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Filter sent with the most recent call to a collection method
    pub fn last_filter(&self, method: &str) -> Option<Value> {
        self.filters.lock().unwrap().get(method).cloned()
    }

    pub fn issue_snapshot(&self, id: &str) -> Option<Issue> {
        self.issues
            .lock()
            .unwrap()
            .iter()
            .find(|issue| issue.id == id)
            .cloned()
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
    }

    fn record_list(&self, method: &'static str, params: &ListParams) {
        self.record(method);
        if let Some(filter) = &params.filter {
            self.filters.lock().unwrap().insert(method, filter.to_value());
        }
    }

    /// Filters, orders and pages `(filterable view, item)` pairs
    fn page<T: Clone>(&self, items: Vec<(Value, T)>, params: &ListParams) -> Connection<T> {
        let mut ranked: Vec<(usize, T)> = items
            .into_iter()
            .filter_map(|(view, item)| match &params.filter {
                Some(filter) => rank(filter, &view, &self.viewer.id).map(|r| (r, item)),
                None => Some((0, item)),
            })
            .collect();
        ranked.sort_by_key(|(r, _)| *r);

        let offset = params
            .after
            .as_deref()
            .and_then(|cursor| cursor.strip_prefix("cursor-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        let total = ranked.len();
        let nodes: Vec<T> = ranked
            .into_iter()
            .skip(offset)
            .take(params.first as usize)
            .map(|(_, item)| item)
            .collect();

        let page_info = if nodes.is_empty() {
            PageInfo::default()
        } else {
            let end = offset + nodes.len();
            PageInfo {
                start_cursor: Some(format!("cursor-{}", offset)),
                end_cursor: (end < total).then(|| format!("cursor-{}", end)),
            }
        };
        Connection { nodes, page_info }
    }

    fn state_ref(&self, id: &str) -> Option<NamedRef> {
        self.states
            .iter()
            .find(|(_, s)| s.id == id)
            .map(|(_, s)| named(&s.id, &s.name))
    }

    fn user_ref(&self, id: &str) -> Option<NamedRef> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| named(&u.id, &u.name))
    }

    fn label_refs(&self, ids: &[String]) -> LabelNodes {
        LabelNodes {
            nodes: ids
                .iter()
                .filter_map(|id| {
                    self.labels
                        .iter()
                        .find(|(_, l)| &l.id == id)
                        .map(|(_, l)| named(&l.id, &l.name))
                })
                .collect(),
        }
    }

    fn apply(&self, issue: &mut Issue, input: &IssueInput) {
        if let Some(team_id) = &input.team_id {
            if let Some(team) = self.teams.iter().find(|t| &t.id == team_id) {
                issue.team = Some(TeamRef {
                    id: team.id.clone(),
                    key: team.key.clone(),
                });
            }
        }
        if let Some(project_id) = &input.project_id {
            issue.project = self
                .projects
                .iter()
                .find(|(p, _)| &p.id == project_id)
                .map(|(p, _)| named(&p.id, &p.name));
        }
        if let Some(title) = &input.title {
            issue.title = title.clone();
        }
        if let Some(description) = &input.description {
            issue.description = Some(description.clone());
        }
        if let Some(state_id) = &input.state_id {
            issue.state = self.state_ref(state_id);
        }
        if let Some(label_ids) = &input.label_ids {
            issue.labels = Some(self.label_refs(label_ids));
        }
        if let Some(assignee_id) = &input.assignee_id {
            issue.assignee = self.user_ref(assignee_id);
        }
        if let Some(priority) = input.priority {
            issue.priority = Some(priority as f64);
        }
    }
}

fn view<T: Serialize>(item: &T) -> Value {
    serde_json::to_value(item).unwrap_or(Value::Null)
}

fn with_team(item: Value, team_id: &str) -> Value {
    let mut item = item;
    item["team"] = json!({ "id": team_id });
    item
}

/// Match rank of a filter against an entity view; `None` when it fails
fn rank(clause: &FilterClause, value: &Value, viewer_id: &str) -> Option<usize> {
    match clause {
        FilterClause::And(clauses) => clauses
            .iter()
            .map(|c| rank(c, value, viewer_id))
            .try_fold(0, |worst, r| r.map(|r| worst.max(r))),
        FilterClause::Or(clauses) => clauses
            .iter()
            .position(|c| rank(c, value, viewer_id).is_some()),
        FilterClause::Fields(fields) => fields.iter().try_fold(0, |worst, (name, c)| {
            field_rank(name, c, value, viewer_id).map(|r| worst.max(r))
        }),
        FilterClause::Eq(expected) => (value == expected).then_some(0),
        FilterClause::In(options) => options.contains(value).then_some(0),
        FilterClause::Gte(bound) => match (value.as_str(), bound.as_str()) {
            (Some(actual), Some(bound)) if actual >= bound => Some(0),
            _ => None,
        },
        FilterClause::IsNull(null) => (value.is_null() == *null).then_some(0),
    }
}

fn field_rank(name: &str, clause: &FilterClause, value: &Value, viewer_id: &str) -> Option<usize> {
    match name {
        "some" => {
            let items = value
                .get("nodes")
                .and_then(Value::as_array)
                .or_else(|| value.as_array())?;
            items
                .iter()
                .filter_map(|item| rank(clause, item, viewer_id))
                .min()
        }
        "isMe" => {
            let is_me = value.get("id").and_then(Value::as_str) == Some(viewer_id);
            rank(clause, &Value::Bool(is_me), viewer_id)
        }
        _ => rank(clause, value.get(name).unwrap_or(&Value::Null), viewer_id),
    }
}

#[async_trait]
impl LinearApi for MockApi {
    async fn viewer(&self) -> Result<User, ApiError> {
        self.record("viewer");
        Ok(self.viewer.clone())
    }

    async fn teams(&self, params: &ListParams) -> Result<Connection<Team>, ApiError> {
        self.record_list("teams", params);
        let items = self.teams.iter().map(|t| (view(t), t.clone())).collect();
        Ok(self.page(items, params))
    }

    async fn team(&self, id: &str) -> Result<Option<Team>, ApiError> {
        self.record("team");
        Ok(self.teams.iter().find(|t| t.id == id).cloned())
    }

    async fn team_states(
        &self,
        team_id: &str,
        first: u32,
    ) -> Result<Connection<WorkflowState>, ApiError> {
        self.record("team_states");
        let items = self
            .states
            .iter()
            .filter(|(team, _)| team == team_id)
            .map(|(_, s)| (view(s), s.clone()))
            .collect();
        Ok(self.page(items, &ListParams::first(first)))
    }

    async fn projects(&self, params: &ListParams) -> Result<Connection<Project>, ApiError> {
        self.record_list("projects", params);
        let items = self
            .projects
            .iter()
            .map(|(p, team_ids)| {
                let mut v = view(p);
                v["accessibleTeams"] =
                    json!({ "nodes": team_ids.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>() });
                (v, p.clone())
            })
            .collect();
        Ok(self.page(items, params))
    }

    async fn project(&self, id: &str) -> Result<Option<Project>, ApiError> {
        self.record("project");
        Ok(self
            .projects
            .iter()
            .find(|(p, _)| p.id == id)
            .map(|(p, _)| p.clone()))
    }

    async fn project_milestones(
        &self,
        project_id: &str,
        first: u32,
    ) -> Result<Connection<Milestone>, ApiError> {
        self.record("project_milestones");
        let items = self
            .milestones
            .iter()
            .filter(|(p, _)| p == project_id)
            .map(|(_, m)| (view(m), m.clone()))
            .collect();
        Ok(self.page(items, &ListParams::first(first)))
    }

    async fn milestones(&self, params: &ListParams) -> Result<Connection<Milestone>, ApiError> {
        self.record_list("milestones", params);
        let items = self.milestones.iter().map(|(_, m)| (view(m), m.clone())).collect();
        Ok(self.page(items, params))
    }

    async fn milestone(&self, id: &str) -> Result<Option<Milestone>, ApiError> {
        self.record("milestone");
        Ok(self
            .milestones
            .iter()
            .find(|(_, m)| m.id == id)
            .map(|(_, m)| m.clone()))
    }

    async fn roadmaps(&self, params: &ListParams) -> Result<Connection<Roadmap>, ApiError> {
        self.record_list("roadmaps", params);
        let items = self.roadmaps.iter().map(|(r, _)| (view(r), r.clone())).collect();
        Ok(self.page(items, params))
    }

    async fn roadmap(&self, id: &str) -> Result<Option<Roadmap>, ApiError> {
        self.record("roadmap");
        Ok(self
            .roadmaps
            .iter()
            .find(|(r, _)| r.id == id)
            .map(|(r, _)| r.clone()))
    }

    async fn roadmap_projects(
        &self,
        roadmap_id: &str,
        first: u32,
    ) -> Result<Connection<Project>, ApiError> {
        self.record("roadmap_projects");
        let project_ids: Vec<String> = self
            .roadmaps
            .iter()
            .find(|(r, _)| r.id == roadmap_id)
            .map(|(_, ids)| ids.clone())
            .unwrap_or_default();
        let items = self
            .projects
            .iter()
            .filter(|(p, _)| project_ids.contains(&p.id))
            .map(|(p, _)| (view(p), p.clone()))
            .collect();
        Ok(self.page(items, &ListParams::first(first)))
    }

    async fn project_teams(
        &self,
        project_id: &str,
        first: u32,
    ) -> Result<Connection<Team>, ApiError> {
        self.record("project_teams");
        let team_ids: Vec<String> = self
            .projects
            .iter()
            .find(|(p, _)| p.id == project_id)
            .map(|(_, ids)| ids.clone())
            .unwrap_or_default();
        let items = self
            .teams
            .iter()
            .filter(|t| team_ids.contains(&t.id))
            .map(|t| (view(t), t.clone()))
            .collect();
        Ok(self.page(items, &ListParams::first(first)))
    }

    async fn workflow_states(
        &self,
        params: &ListParams,
    ) -> Result<Connection<WorkflowState>, ApiError> {
        self.record_list("workflow_states", params);
        let items = self
            .states
            .iter()
            .map(|(team, s)| (with_team(view(s), team), s.clone()))
            .collect();
        Ok(self.page(items, params))
    }

    async fn workflow_state(&self, id: &str) -> Result<Option<WorkflowState>, ApiError> {
        self.record("workflow_state");
        Ok(self
            .states
            .iter()
            .find(|(_, s)| s.id == id)
            .map(|(_, s)| s.clone()))
    }

    async fn issue_labels(&self, params: &ListParams) -> Result<Connection<Label>, ApiError> {
        self.record_list("issue_labels", params);
        let items = self
            .labels
            .iter()
            .map(|(team, l)| (with_team(view(l), team), l.clone()))
            .collect();
        Ok(self.page(items, params))
    }

    async fn users(&self, params: &ListParams) -> Result<Connection<User>, ApiError> {
        self.record_list("users", params);
        let items = self.users.iter().map(|u| (view(u), u.clone())).collect();
        Ok(self.page(items, params))
    }

    async fn issues(&self, params: &ListParams) -> Result<Connection<Issue>, ApiError> {
        self.record_list("issues", params);
        let items = self
            .issues
            .lock()
            .unwrap()
            .iter()
            .map(|i| (view(i), i.clone()))
            .collect();
        Ok(self.page(items, params))
    }

    async fn issue(&self, id: &str) -> Result<Option<Issue>, ApiError> {
        self.record("issue");
        Ok(self.issue_snapshot(id))
    }

    async fn search_issues(
        &self,
        term: &str,
        params: &ListParams,
    ) -> Result<Connection<Issue>, ApiError> {
        self.record_list("search_issues", params);
        let term = term.to_lowercase();
        let items = self
            .issues
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.title.to_lowercase().contains(&term))
            .map(|i| {
                // Search hits only carry summary fields
                let hit = Issue {
                    id: i.id.clone(),
                    identifier: i.identifier.clone(),
                    title: i.title.clone(),
                    ..Default::default()
                };
                (view(i), hit)
            })
            .collect();
        Ok(self.page(items, params))
    }

    async fn issue_comments(
        &self,
        issue_id: &str,
        first: u32,
    ) -> Result<Connection<Comment>, ApiError> {
        self.record("issue_comments");
        let items = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|(issue, _)| issue == issue_id)
            .map(|(_, c)| (view(c), c.clone()))
            .collect();
        Ok(self.page(items, &ListParams::first(first)))
    }

    async fn issue_history(
        &self,
        issue_id: &str,
        first: u32,
    ) -> Result<Connection<HistoryEntry>, ApiError> {
        self.record("issue_history");
        let items = self
            .history
            .iter()
            .filter(|(issue, _)| issue == issue_id)
            .map(|(_, h)| (view(h), h.clone()))
            .collect();
        Ok(self.page(items, &ListParams::first(first)))
    }

    async fn cycles(&self, params: &ListParams) -> Result<Connection<Cycle>, ApiError> {
        self.record_list("cycles", params);
        let items = self
            .cycles
            .iter()
            .map(|(team, c)| (with_team(view(c), team), c.clone()))
            .collect();
        Ok(self.page(items, params))
    }

    async fn documents(&self, params: &ListParams) -> Result<Connection<Document>, ApiError> {
        self.record_list("documents", params);
        let items = self.documents.iter().map(|d| (view(d), d.clone())).collect();
        Ok(self.page(items, params))
    }

    async fn document(&self, id: &str) -> Result<Option<Document>, ApiError> {
        self.record("document");
        Ok(self.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn search_documents(
        &self,
        term: &str,
        params: &ListParams,
    ) -> Result<Connection<Document>, ApiError> {
        self.record_list("search_documents", params);
        let term = term.to_lowercase();
        let items = self
            .documents
            .iter()
            .filter(|d| {
                d.title.to_lowercase().contains(&term)
                    || d
                        .content
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&term))
            })
            .map(|d| (view(d), d.clone()))
            .collect();
        Ok(self.page(items, params))
    }

    async fn notifications(
        &self,
        params: &ListParams,
    ) -> Result<Connection<Notification>, ApiError> {
        self.record_list("notifications", params);
        let items = self
            .notifications
            .iter()
            .map(|n| (view(n), n.clone()))
            .collect();
        Ok(self.page(items, params))
    }

    async fn create_issue(&self, input: &IssueInput) -> Result<Option<Issue>, ApiError> {
        self.record("create_issue");
        let mut issues = self.issues.lock().unwrap();
        let number = issues.len() as u64 + 1;
        let mut issue = Issue {
            id: format!("issue-{}", number),
            number,
            labels: Some(LabelNodes::default()),
            ..Default::default()
        };
        self.apply(&mut issue, input);
        let key = issue.team.as_ref().map(|t| t.key.clone()).unwrap_or_default();
        issue.identifier = format!("{}-{}", key, number);
        issues.push(issue.clone());
        Ok(Some(issue))
    }

    async fn update_issue(&self, id: &str, input: &IssueInput) -> Result<(), ApiError> {
        self.record("update_issue");
        self.updates
            .lock()
            .unwrap()
            .push((id.to_string(), input.clone()));
        let mut issues = self.issues.lock().unwrap();
        let issue = issues
            .iter_mut()
            .find(|issue| issue.id == id)
            .ok_or_else(|| ApiError::GraphQl {
                message: "Entity not found: Issue".to_string(),
                kind: None,
            })?;
        self.apply(issue, input);
        Ok(())
    }

    async fn create_comment(
        &self,
        issue_id: &str,
        body: &str,
    ) -> Result<Option<Comment>, ApiError> {
        self.record("create_comment");
        let mut comments = self.comments.lock().unwrap();
        let comment = Comment {
            id: format!("comment-{}", comments.len() + 1),
            body: body.to_string(),
            created_at: Some("2024-02-01T00:00:00.000Z".to_string()),
            user: Some(named(&self.viewer.id, &self.viewer.name)),
        };
        comments.push((issue_id.to_string(), comment.clone()));
        Ok(Some(comment))
    }

    async fn create_attachment(
        &self,
        input: &AttachmentInput,
    ) -> Result<Option<Attachment>, ApiError> {
        self.record("create_attachment");
        let mut attachments = self.attachments.lock().unwrap();
        attachments.push(input.clone());
        Ok(Some(Attachment {
            id: format!("attachment-{}", attachments.len()),
            title: input.title.clone(),
            url: input.url.clone(),
        }))
    }

    async fn create_issue_relation(
        &self,
        issue_id: &str,
        related_issue_id: &str,
        relation: RelationType,
    ) -> Result<(), ApiError> {
        self.record("create_issue_relation");
        self.relations.lock().unwrap().push((
            issue_id.to_string(),
            related_issue_id.to_string(),
            relation,
        ));
        Ok(())
    }
}
