//! Remote entity shapes
//!
//! Only the fields the client actually reads are modeled. Every struct
//! deserializes from the GraphQL response with camelCase keys, and missing
//! optional fields default to `None`.

use serde::{Deserialize, Serialize};

/// A team, cached whole by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
}

impl Team {
    pub fn is_active(&self) -> bool {
        self.archived_at.is_none()
    }
}

/// Named reference to a related entity (`{ id name }`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NamedRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Team reference carried on an issue (`{ id key }`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    pub id: String,
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug_id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<NamedRef>,
    #[serde(default)]
    pub target_date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub health: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub issue_count_history: Vec<i64>,
    #[serde(default)]
    pub completed_issue_count_history: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub state_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub parent: Option<NamedRef>,
}

impl Label {
    /// Group column: parent label name, `group` for group labels
    pub fn group(&self) -> &str {
        match &self.parent {
            Some(parent) => &parent.name,
            None if self.is_group => "group",
            None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// An issue with the relations the client renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub state: Option<NamedRef>,
    #[serde(default)]
    pub team: Option<TeamRef>,
    #[serde(default)]
    pub project: Option<NamedRef>,
    #[serde(default)]
    pub assignee: Option<NamedRef>,
    #[serde(default)]
    pub labels: Option<LabelNodes>,
}

/// Inline label connection on an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LabelNodes {
    pub nodes: Vec<NamedRef>,
}

impl Issue {
    pub fn label_refs(&self) -> &[NamedRef] {
        self.labels.as_ref().map(|l| l.nodes.as_slice()).unwrap_or(&[])
    }

    pub fn label_names(&self) -> Vec<&str> {
        self.label_refs()
            .iter()
            .map(|label| label.name.as_str())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Priority as rendered: integral values without a fraction
    pub fn priority_text(&self) -> String {
        match self.priority {
            Some(p) if p.fract() == 0.0 => format!("{}", p as i64),
            Some(p) => p.to_string(),
            None => String::new(),
        }
    }

    /// Identifier when known, otherwise the raw id
    pub fn display_ref(&self) -> &str {
        if self.identifier.is_empty() {
            &self.id
        } else {
            &self.identifier
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user: Option<NamedRef>,
}

/// One entry of an issue's change history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub actor: Option<NamedRef>,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub from_state: Option<NamedRef>,
    #[serde(default)]
    pub to_state: Option<NamedRef>,
    #[serde(default)]
    pub from_assignee: Option<NamedRef>,
    #[serde(default)]
    pub to_assignee: Option<NamedRef>,
    #[serde(default)]
    pub from_priority: Option<f64>,
    #[serde(default)]
    pub to_priority: Option<f64>,
    #[serde(default)]
    pub from_project: Option<NamedRef>,
    #[serde(default)]
    pub to_project: Option<NamedRef>,
    #[serde(default)]
    pub from_title: Option<String>,
    #[serde(default)]
    pub to_title: Option<String>,
}

impl HistoryEntry {
    pub fn actor_name(&self) -> &str {
        self.actor
            .as_ref()
            .map(|a| a.name.as_str())
            .or(self.actor_id.as_deref())
            .unwrap_or("")
    }

    pub fn change_type(&self) -> &'static str {
        if self.from_state.is_some() || self.to_state.is_some() {
            "state"
        } else if self.from_assignee.is_some() || self.to_assignee.is_some() {
            "assignee"
        } else if self.from_priority.is_some() || self.to_priority.is_some() {
            "priority"
        } else if self.from_project.is_some() || self.to_project.is_some() {
            "project"
        } else if self.from_title.is_some() || self.to_title.is_some() {
            "title"
        } else {
            "update"
        }
    }

    pub fn from_value(&self) -> String {
        change_value(
            &self.from_state,
            &self.from_assignee,
            self.from_priority,
            &self.from_project,
            &self.from_title,
        )
    }

    pub fn to_value(&self) -> String {
        change_value(
            &self.to_state,
            &self.to_assignee,
            self.to_priority,
            &self.to_project,
            &self.to_title,
        )
    }
}

fn change_value(
    state: &Option<NamedRef>,
    assignee: &Option<NamedRef>,
    priority: Option<f64>,
    project: &Option<NamedRef>,
    title: &Option<String>,
) -> String {
    if let Some(state) = state {
        return state.name.clone();
    }
    if let Some(assignee) = assignee {
        return assignee.name.clone();
    }
    if let Some(priority) = priority {
        return priority.to_string();
    }
    if let Some(project) = project {
        return project.name.clone();
    }
    title.clone().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub id: String,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub ends_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Cycle {
    /// `completed` once closed, otherwise `active`
    pub fn status(&self) -> &'static str {
        if self.completed_at.is_some() {
            "completed"
        } else {
            "active"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub project: Option<NamedRef>,
    #[serde(default)]
    pub creator: Option<NamedRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub target_date: Option<String>,
    #[serde(default)]
    pub archived_at: Option<String>,
    #[serde(default)]
    pub project: Option<NamedRef>,
}

impl Milestone {
    /// `archived` once archived, otherwise `active`
    pub fn status(&self) -> &'static str {
        if self.archived_at.is_some() {
            "archived"
        } else {
            "active"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub owner: Option<NamedRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub read_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}
