//! # Remote API
//!
//! The issue tracker is reached through the [`LinearApi`] trait: paginated
//! collections taking [`ListParams`], lookups by id returning `Option`, and
//! mutations returning the created or updated entity. [`LinearClient`] is the
//! GraphQL implementation; tests use an in-memory one.
//!
//! Nothing here retries or times out on its own. A failure is reported once
//! and surfaces to the caller.

mod client;
mod queries;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::{
    Attachment, Comment, Cycle, Document, FilterClause, HistoryEntry, Issue, Label, Milestone,
    Notification, Project, Roadmap, Team, User, WorkflowState,
};

pub use client::{LinearClient, DEFAULT_ENDPOINT};

/// Errors from the HTTP/GraphQL transport
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status {code}: {body}")]
    Status { code: u16, body: String },

    /// GraphQL `errors` array; `kind` is the first error's `extensions.type`
    #[error("{message}")]
    GraphQl { message: String, kind: Option<String> },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Structured throttling signal (HTTP 429 or a rate-limit error type)
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ApiError::Status { code, .. } => *code == 429,
            ApiError::GraphQl { kind, .. } => kind
                .as_deref()
                .is_some_and(|k| k.to_lowercase().contains("rate")),
            _ => false,
        }
    }

    /// GraphQL lookup of an id that does not exist
    pub fn is_entity_not_found(&self) -> bool {
        match self {
            ApiError::GraphQl { message, kind } => {
                message.to_lowercase().contains("not found")
                    || kind
                        .as_deref()
                        .is_some_and(|k| k.to_lowercase().contains("not found"))
            }
            _ => false,
        }
    }
}

/// Page cursors of a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// One page of a paginated collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    #[serde(default)]
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    pub fn new(nodes: Vec<T>) -> Self {
        Self {
            nodes,
            page_info: PageInfo::default(),
        }
    }

    pub fn first(self) -> Option<T> {
        self.nodes.into_iter().next()
    }
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "Ascending",
            SortOrder::Descending => "Descending",
        }
    }
}

/// `{first, after, filter, sort}` for a collection call
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub first: u32,
    pub after: Option<String>,
    pub filter: Option<FilterClause>,
    pub sort: Option<(String, SortOrder)>,
}

impl ListParams {
    pub fn first(first: u32) -> Self {
        Self {
            first,
            after: None,
            filter: None,
            sort: None,
        }
    }

    pub fn after(mut self, cursor: Option<String>) -> Self {
        self.after = cursor;
        self
    }

    /// Sets the filter; an empty clause means no filter
    pub fn filter(mut self, filter: FilterClause) -> Self {
        self.filter = if filter.is_empty() { None } else { Some(filter) };
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    /// GraphQL variables for this page request
    pub fn variables(&self) -> Value {
        let mut vars = json!({ "first": self.first });
        if let Some(after) = &self.after {
            vars["after"] = json!(after);
        }
        if let Some(filter) = &self.filter {
            vars["filter"] = filter.to_value();
        }
        if let Some((field, order)) = &self.sort {
            let mut entry = serde_json::Map::new();
            entry.insert(field.clone(), json!({ "order": order.as_str() }));
            vars["sort"] = Value::Array(vec![Value::Object(entry)]);
        }
        vars
    }
}

/// Fields for issue creation and update; unset fields are left untouched
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl IssueInput {
    pub fn is_empty(&self) -> bool {
        self == &IssueInput::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInput {
    pub issue_id: String,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
    Blocks,
    Related,
    Duplicate,
}

/// Collaborator contract for the remote issue tracker
#[async_trait]
pub trait LinearApi: Send + Sync {
    /// The authenticated user
    async fn viewer(&self) -> Result<User, ApiError>;

    async fn teams(&self, params: &ListParams) -> Result<Connection<Team>, ApiError>;
    async fn team(&self, id: &str) -> Result<Option<Team>, ApiError>;
    async fn team_states(
        &self,
        team_id: &str,
        first: u32,
    ) -> Result<Connection<WorkflowState>, ApiError>;

    async fn projects(&self, params: &ListParams) -> Result<Connection<Project>, ApiError>;
    async fn project(&self, id: &str) -> Result<Option<Project>, ApiError>;
    async fn project_milestones(
        &self,
        project_id: &str,
        first: u32,
    ) -> Result<Connection<Milestone>, ApiError>;
    async fn project_teams(
        &self,
        project_id: &str,
        first: u32,
    ) -> Result<Connection<Team>, ApiError>;

    async fn milestones(&self, params: &ListParams) -> Result<Connection<Milestone>, ApiError>;
    async fn milestone(&self, id: &str) -> Result<Option<Milestone>, ApiError>;

    async fn roadmaps(&self, params: &ListParams) -> Result<Connection<Roadmap>, ApiError>;
    async fn roadmap(&self, id: &str) -> Result<Option<Roadmap>, ApiError>;
    async fn roadmap_projects(
        &self,
        roadmap_id: &str,
        first: u32,
    ) -> Result<Connection<Project>, ApiError>;

    async fn workflow_states(
        &self,
        params: &ListParams,
    ) -> Result<Connection<WorkflowState>, ApiError>;
    async fn workflow_state(&self, id: &str) -> Result<Option<WorkflowState>, ApiError>;

    async fn issue_labels(&self, params: &ListParams) -> Result<Connection<Label>, ApiError>;
    async fn users(&self, params: &ListParams) -> Result<Connection<User>, ApiError>;

    async fn issues(&self, params: &ListParams) -> Result<Connection<Issue>, ApiError>;
    async fn issue(&self, id: &str) -> Result<Option<Issue>, ApiError>;
    /// Full-text search; hits may carry only partial fields
    async fn search_issues(
        &self,
        term: &str,
        params: &ListParams,
    ) -> Result<Connection<Issue>, ApiError>;
    async fn issue_comments(
        &self,
        issue_id: &str,
        first: u32,
    ) -> Result<Connection<Comment>, ApiError>;
    async fn issue_history(
        &self,
        issue_id: &str,
        first: u32,
    ) -> Result<Connection<HistoryEntry>, ApiError>;

    async fn cycles(&self, params: &ListParams) -> Result<Connection<Cycle>, ApiError>;

    async fn documents(&self, params: &ListParams) -> Result<Connection<Document>, ApiError>;
    async fn document(&self, id: &str) -> Result<Option<Document>, ApiError>;
    async fn search_documents(
        &self,
        term: &str,
        params: &ListParams,
    ) -> Result<Connection<Document>, ApiError>;

    /// Inbox notifications of the authenticated user
    async fn notifications(
        &self,
        params: &ListParams,
    ) -> Result<Connection<Notification>, ApiError>;

    async fn create_issue(&self, input: &IssueInput) -> Result<Option<Issue>, ApiError>;
    async fn update_issue(&self, id: &str, input: &IssueInput) -> Result<(), ApiError>;
    async fn create_comment(&self, issue_id: &str, body: &str)
        -> Result<Option<Comment>, ApiError>;
    async fn create_attachment(
        &self,
        input: &AttachmentInput,
    ) -> Result<Option<Attachment>, ApiError>;
    async fn create_issue_relation(
        &self,
        issue_id: &str,
        related_issue_id: &str,
        relation: RelationType,
    ) -> Result<(), ApiError>;
}
