//! Issue list filters
//!
//! Builds the `filter` variable for issue listing from optional options.
//! Referenceable fields reuse the resolver's precedence, so a value the list
//! filter accepts is one that direct resolution would accept too. Free-text
//! search is not part of the filter; it selects the search endpoint instead.

use crate::domain::filter::{project_reference, state_reference, team_reference, user_reference};
use crate::domain::FilterClause;
use crate::storage::SavedQuery;

use super::ME;

/// Filter options for listing issues
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilterOptions {
    pub team: Option<String>,
    pub project: Option<String>,
    pub state: Option<String>,
    pub assignee: Option<String>,
    /// Every listed label must be present
    pub labels: Vec<String>,
    pub updated_since: Option<String>,
    pub created_since: Option<String>,
    pub search: Option<String>,
}

impl IssueFilterOptions {
    /// Fills unset options from a saved query
    ///
    /// Each field is merged on its own: an explicit team does not drop a
    /// saved label list. Explicit labels replace saved labels wholesale.
    pub fn merged_with(self, saved: &SavedQuery) -> Self {
        Self {
            team: self.team.or_else(|| saved.team.clone()),
            project: self.project.or_else(|| saved.project.clone()),
            state: self.state.or_else(|| saved.state.clone()),
            assignee: self.assignee.or_else(|| saved.assignee.clone()),
            labels: if self.labels.is_empty() {
                saved.labels.clone()
            } else {
                self.labels
            },
            updated_since: self.updated_since.or_else(|| saved.updated_since.clone()),
            created_since: self.created_since.or_else(|| saved.created_since.clone()),
            search: self.search.or_else(|| saved.search.clone()),
        }
    }

    /// Saved-query form of these options
    pub fn to_saved(&self, name: &str) -> SavedQuery {
        SavedQuery {
            name: name.to_string(),
            search: self.search.clone(),
            team: self.team.clone(),
            project: self.project.clone(),
            state: self.state.clone(),
            assignee: self.assignee.clone(),
            labels: self.labels.clone(),
            updated_since: self.updated_since.clone(),
            created_since: self.created_since.clone(),
        }
    }
}

/// `{ isMe }`, `{ email }` or id/name precedence for an assignee value
fn assignee_clause(reference: &str) -> FilterClause {
    if reference == ME {
        FilterClause::field_eq("isMe", true)
    } else if reference.contains('@') {
        FilterClause::field_eq("email", reference)
    } else {
        user_reference(reference)
    }
}

/// Translates options into the remote filter grammar
///
/// Returns an empty clause when nothing is constrained.
pub fn build_issue_filter(options: &IssueFilterOptions) -> FilterClause {
    let mut filter = FilterClause::empty();

    if let Some(team) = &options.team {
        filter = filter.with_field("team", team_reference(team));
    }
    if let Some(project) = &options.project {
        filter = filter.with_field("project", project_reference(project));
    }
    if let Some(state) = &options.state {
        filter = filter.with_field("state", state_reference(state));
    }
    if let Some(assignee) = &options.assignee {
        filter = filter.with_field("assignee", assignee_clause(assignee));
    }
    if !options.labels.is_empty() {
        let every = options
            .labels
            .iter()
            .map(|label| FilterClause::some(FilterClause::field_eq("name", label.as_str())))
            .collect();
        filter = filter.with_field("labels", FilterClause::And(every));
    }
    if let Some(since) = &options.updated_since {
        filter = filter.with_field("updatedAt", FilterClause::gte(since.as_str()));
    }
    if let Some(since) = &options.created_since {
        filter = filter.with_field("createdAt", FilterClause::gte(since.as_str()));
    }

    filter
}
