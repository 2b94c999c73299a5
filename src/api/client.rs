//! GraphQL client for the Linear API

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::queries;
use super::{
    ApiError, AttachmentInput, Connection, IssueInput, LinearApi, ListParams, RelationType,
};
use crate::domain::{
    Attachment, Comment, Cycle, Document, HistoryEntry, Issue, Label, Milestone, Notification,
    Project, Roadmap, Team, User, WorkflowState,
};

pub const DEFAULT_ENDPOINT: &str = "https://api.linear.app/graphql";

/// Credentialed client, built once per command invocation
pub struct LinearClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQlExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQlExtensions {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl LinearClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into().trim().to_string(),
        }
    }

    /// Executes a document and returns its `data` object
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, ApiError> {
        debug!(endpoint = %self.endpoint, "graphql request");

        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: Option<GraphQlResponse> = serde_json::from_str(&body).ok();
        if let Some(parsed) = &parsed {
            if let Some(first) = parsed.errors.first() {
                let message = parsed
                    .errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                let kind = first
                    .extensions
                    .as_ref()
                    .and_then(|ext| ext.kind.clone().or_else(|| ext.code.clone()));
                return Err(ApiError::GraphQl { message, kind });
            }
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
                body,
            });
        }

        parsed
            .and_then(|p| p.data)
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }

    /// Executes a document and decodes the value at `path` inside `data`
    async fn fetch<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        path: &[&str],
    ) -> Result<T, ApiError> {
        let data = self.execute(query, variables).await?;
        let mut value = &data;
        for segment in path {
            value = value.get(segment).unwrap_or(&Value::Null);
        }
        serde_json::from_value(value.clone())
            .map_err(|e| ApiError::Decode(format!("{}: {}", path.join("."), e)))
    }

    /// Lookup by id where a missing entity is `None` rather than an error
    async fn lookup<T: DeserializeOwned>(
        &self,
        query: &str,
        id: &str,
        field: &str,
    ) -> Result<Option<T>, ApiError> {
        match self.fetch::<Option<T>>(query, json!({ "id": id }), &[field]).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_entity_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn nested_connection<T: DeserializeOwned>(
        &self,
        query: &str,
        id: &str,
        first: u32,
        path: &[&str],
    ) -> Result<Connection<T>, ApiError> {
        let connection: Option<Connection<T>> = self
            .fetch(query, json!({ "id": id, "first": first }), path)
            .await?;
        Ok(connection.unwrap_or_default())
    }
}

fn search_variables(term: &str, params: &ListParams) -> Value {
    let mut vars = params.variables();
    vars["term"] = json!(term);
    if let Some(map) = vars.as_object_mut() {
        map.remove("sort");
    }
    vars
}

#[async_trait]
impl LinearApi for LinearClient {
    async fn viewer(&self) -> Result<User, ApiError> {
        self.fetch(&queries::viewer(), json!({}), &["viewer"]).await
    }

    async fn teams(&self, params: &ListParams) -> Result<Connection<Team>, ApiError> {
        self.fetch(&queries::teams(), params.variables(), &["teams"])
            .await
    }

    async fn team(&self, id: &str) -> Result<Option<Team>, ApiError> {
        self.lookup(&queries::team(), id, "team").await
    }

    async fn team_states(
        &self,
        team_id: &str,
        first: u32,
    ) -> Result<Connection<WorkflowState>, ApiError> {
        self.nested_connection(&queries::team_states(), team_id, first, &["team", "states"])
            .await
    }

    async fn projects(&self, params: &ListParams) -> Result<Connection<Project>, ApiError> {
        self.fetch(&queries::projects(), params.variables(), &["projects"])
            .await
    }

    async fn project(&self, id: &str) -> Result<Option<Project>, ApiError> {
        self.lookup(&queries::project(), id, "project").await
    }

    async fn project_milestones(
        &self,
        project_id: &str,
        first: u32,
    ) -> Result<Connection<Milestone>, ApiError> {
        self.nested_connection(
            &queries::project_milestones(),
            project_id,
            first,
            &["project", "projectMilestones"],
        )
        .await
    }

    async fn project_teams(
        &self,
        project_id: &str,
        first: u32,
    ) -> Result<Connection<Team>, ApiError> {
        self.nested_connection(
            &queries::project_teams(),
            project_id,
            first,
            &["project", "teams"],
        )
        .await
    }

    async fn workflow_states(
        &self,
        params: &ListParams,
    ) -> Result<Connection<WorkflowState>, ApiError> {
        self.fetch(&queries::workflow_states(), params.variables(), &["workflowStates"])
            .await
    }

    async fn workflow_state(&self, id: &str) -> Result<Option<WorkflowState>, ApiError> {
        self.lookup(&queries::workflow_state(), id, "workflowState")
            .await
    }

    async fn issue_labels(&self, params: &ListParams) -> Result<Connection<Label>, ApiError> {
        self.fetch(&queries::issue_labels(), params.variables(), &["issueLabels"])
            .await
    }

    async fn users(&self, params: &ListParams) -> Result<Connection<User>, ApiError> {
        self.fetch(&queries::users(), params.variables(), &["users"])
            .await
    }

    async fn issues(&self, params: &ListParams) -> Result<Connection<Issue>, ApiError> {
        self.fetch(&queries::issues(), params.variables(), &["issues"])
            .await
    }

    async fn issue(&self, id: &str) -> Result<Option<Issue>, ApiError> {
        self.lookup(&queries::issue(), id, "issue").await
    }

    async fn search_issues(
        &self,
        term: &str,
        params: &ListParams,
    ) -> Result<Connection<Issue>, ApiError> {
        self.fetch(
            &queries::search_issues(),
            search_variables(term, params),
            &["searchIssues"],
        )
        .await
    }

    async fn issue_comments(
        &self,
        issue_id: &str,
        first: u32,
    ) -> Result<Connection<Comment>, ApiError> {
        self.nested_connection(
            &queries::issue_comments(),
            issue_id,
            first,
            &["issue", "comments"],
        )
        .await
    }

    async fn issue_history(
        &self,
        issue_id: &str,
        first: u32,
    ) -> Result<Connection<HistoryEntry>, ApiError> {
        let mut history: Connection<HistoryEntry> = self
            .nested_connection(
                &queries::issue_history(),
                issue_id,
                first,
                &["issue", "history"],
            )
            .await?;
        // Oldest first; ISO-8601 timestamps order lexically.
        history
            .nodes
            .sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(history)
    }

    async fn milestones(&self, params: &ListParams) -> Result<Connection<Milestone>, ApiError> {
        self.fetch(&queries::milestones(), params.variables(), &["projectMilestones"])
            .await
    }

    async fn milestone(&self, id: &str) -> Result<Option<Milestone>, ApiError> {
        self.lookup(&queries::milestone(), id, "projectMilestone").await
    }

    async fn roadmaps(&self, params: &ListParams) -> Result<Connection<Roadmap>, ApiError> {
        self.fetch(&queries::roadmaps(), params.variables(), &["roadmaps"])
            .await
    }

    async fn roadmap(&self, id: &str) -> Result<Option<Roadmap>, ApiError> {
        self.lookup(&queries::roadmap(), id, "roadmap").await
    }

    async fn roadmap_projects(
        &self,
        roadmap_id: &str,
        first: u32,
    ) -> Result<Connection<Project>, ApiError> {
        self.nested_connection(
            &queries::roadmap_projects(),
            roadmap_id,
            first,
            &["roadmap", "projects"],
        )
        .await
    }

    async fn notifications(
        &self,
        params: &ListParams,
    ) -> Result<Connection<Notification>, ApiError> {
        self.fetch(&queries::notifications(), params.variables(), &["notifications"])
            .await
    }

    async fn cycles(&self, params: &ListParams) -> Result<Connection<Cycle>, ApiError> {
        self.fetch(&queries::cycles(), params.variables(), &["cycles"])
            .await
    }

    async fn documents(&self, params: &ListParams) -> Result<Connection<Document>, ApiError> {
        self.fetch(&queries::documents(), params.variables(), &["documents"])
            .await
    }

    async fn document(&self, id: &str) -> Result<Option<Document>, ApiError> {
        self.lookup(&queries::document(), id, "document").await
    }

    async fn search_documents(
        &self,
        term: &str,
        params: &ListParams,
    ) -> Result<Connection<Document>, ApiError> {
        let mut vars = search_variables(term, params);
        if let Some(map) = vars.as_object_mut() {
            map.remove("filter");
        }
        self.fetch(&queries::search_documents(), vars, &["searchDocuments"])
            .await
    }

    async fn create_issue(&self, input: &IssueInput) -> Result<Option<Issue>, ApiError> {
        self.fetch(
            &queries::create_issue(),
            json!({ "input": input }),
            &["issueCreate", "issue"],
        )
        .await
    }

    async fn update_issue(&self, id: &str, input: &IssueInput) -> Result<(), ApiError> {
        let success: Option<bool> = self
            .fetch(
                &queries::update_issue(),
                json!({ "id": id, "input": input }),
                &["issueUpdate", "success"],
            )
            .await?;
        match success {
            Some(true) => Ok(()),
            _ => Err(ApiError::Decode("issue update was not applied".to_string())),
        }
    }

    async fn create_comment(
        &self,
        issue_id: &str,
        body: &str,
    ) -> Result<Option<Comment>, ApiError> {
        self.fetch(
            &queries::create_comment(),
            json!({ "input": { "issueId": issue_id, "body": body } }),
            &["commentCreate", "comment"],
        )
        .await
    }

    async fn create_attachment(
        &self,
        input: &AttachmentInput,
    ) -> Result<Option<Attachment>, ApiError> {
        self.fetch(
            &queries::create_attachment(),
            json!({ "input": input }),
            &["attachmentCreate", "attachment"],
        )
        .await
    }

    async fn create_issue_relation(
        &self,
        issue_id: &str,
        related_issue_id: &str,
        relation: RelationType,
    ) -> Result<(), ApiError> {
        let success: Option<bool> = self
            .fetch(
                &queries::create_issue_relation(),
                json!({ "input": {
                    "issueId": issue_id,
                    "relatedIssueId": related_issue_id,
                    "type": relation,
                } }),
                &["issueRelationCreate", "success"],
            )
            .await?;
        match success {
            Some(true) => Ok(()),
            _ => Err(ApiError::Decode("issue relation was not created".to_string())),
        }
    }
}
