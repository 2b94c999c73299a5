//! # Reference resolution
//!
//! Turns user-supplied references (team keys, project slugs, state names,
//! label names, emails, issue keys) into entities or ids, memoizing hits in
//! the [`CacheStore`] for [`DEFAULT_TTL_SECONDS`].
//!
//! Every lookup asks the API for `first: 1` with an `or` filter ordered by
//! precedence: exact id (UUID-shaped references only), natural key, display
//! name. A miss is `Ok(None)`; callers decide how to report it. Cached ids
//! that no longer resolve are dropped silently and the lookup falls through
//! to the remote filter.
//!
//! | Kind | Bucket | Key | Cached value |
//! |------|--------|-----|--------------|
//! | team | `teams` | `<ref>` | whole team |
//! | project | `projects` | `<ref>` | id |
//! | workflow state | `workflowStates` | `<team id>:<ref>` | id |
//! | label | `labels` | `<team id>:<name>` | id |
//! | user | `users` | `email:<email>`, `name:<name>` | id |
//!
//! Keys are trimmed and lowercased; the remote query keeps the caller's case.
//! Issues are never cached.

mod issue_filter;

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use tracing::{debug, warn};

use crate::api::{LinearApi, ListParams};
use crate::domain::filter::{
    project_reference, scoped_to_team, state_reference, team_reference, user_email,
    user_reference,
};
use crate::domain::{normalize, FilterClause, Issue, IssueKey, Project, Team, WorkflowState};
use crate::error::LtuiError;
use crate::storage::{Bucket, CacheStore, CachedValue, DEFAULT_TTL_SECONDS};

pub use issue_filter::{build_issue_filter, IssueFilterOptions};

/// Literal assignee reference for the authenticated user
pub const ME: &str = "me";

pub struct Resolver<'a> {
    api: &'a dyn LinearApi,
    cache: &'a CacheStore,
}

impl<'a> Resolver<'a> {
    pub fn new(api: &'a dyn LinearApi, cache: &'a CacheStore) -> Self {
        Self { api, cache }
    }

    /// Stores a hit; a failed write only costs a future cache miss
    fn remember(&self, bucket: Bucket, key: &str, value: CachedValue) {
        if let Err(e) = self.cache.set(bucket, key, value, DEFAULT_TTL_SECONDS) {
            warn!(bucket = bucket.as_str(), key, error = %e, "failed to persist cache entry");
        }
    }

    fn cached_id(&self, bucket: Bucket, key: &str) -> Option<String> {
        match self.cache.get(bucket, key) {
            Some(CachedValue::Id(id)) => Some(id),
            Some(other) => {
                debug!(
                    bucket = bucket.as_str(),
                    key,
                    ?other,
                    "ignoring cache entry of unexpected shape"
                );
                None
            }
            None => None,
        }
    }

    /// Team by id, key or name
    pub async fn team(&self, reference: &str) -> Result<Option<Team>> {
        let key = normalize(reference);
        if let Some(CachedValue::Team(team)) = self.cache.get(Bucket::Teams, &key) {
            debug!(reference, team = %team.key, "team cache hit");
            return Ok(Some(team));
        }

        let params = ListParams::first(1).filter(team_reference(reference.trim()));
        let team = self.api.teams(&params).await?.first();
        if let Some(team) = &team {
            self.remember(Bucket::Teams, &key, CachedValue::Team(team.clone()));
        }
        Ok(team)
    }

    /// Project by id, slug or name
    pub async fn project(&self, reference: &str) -> Result<Option<Project>> {
        let key = normalize(reference);
        if let Some(id) = self.cached_id(Bucket::Projects, &key) {
            match self.api.project(&id).await {
                Ok(Some(project)) => return Ok(Some(project)),
                Ok(None) => debug!(reference, id, "cached project no longer exists"),
                Err(e) => debug!(reference, id, error = %e, "cached project lookup failed"),
            }
        }

        let params = ListParams::first(1).filter(project_reference(reference.trim()));
        let project = self.api.projects(&params).await?.first();
        if let Some(project) = &project {
            self.remember(Bucket::Projects, &key, CachedValue::Id(project.id.clone()));
        }
        Ok(project)
    }

    /// Workflow state of one team by id or name
    pub async fn workflow_state(
        &self,
        team_id: &str,
        reference: &str,
    ) -> Result<Option<WorkflowState>> {
        let key = format!("{}:{}", team_id, normalize(reference));
        if let Some(id) = self.cached_id(Bucket::WorkflowStates, &key) {
            match self.api.workflow_state(&id).await {
                Ok(Some(state)) => return Ok(Some(state)),
                Ok(None) => debug!(reference, id, "cached workflow state no longer exists"),
                Err(e) => debug!(reference, id, error = %e, "cached workflow state lookup failed"),
            }
        }

        let filter = scoped_to_team(team_id, state_reference(reference.trim()));
        let state = self
            .api
            .workflow_states(&ListParams::first(1).filter(filter))
            .await?
            .first();
        if let Some(state) = &state {
            self.remember(Bucket::WorkflowStates, &key, CachedValue::Id(state.id.clone()));
        }
        Ok(state)
    }

    /// Label ids for `names` within one team
    ///
    /// Uncached names are fetched in a single call. The result follows the
    /// caller's order, duplicates included. Every name still unknown after
    /// the fetch is reported in one `not_found` error.
    pub async fn label_ids(&self, team_id: &str, names: &[String]) -> Result<Vec<String>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut unique: Vec<&str> = Vec::new();
        let mut seen = HashSet::new();
        for name in names {
            if seen.insert(normalize(name)) {
                unique.push(name.trim());
            }
        }

        let mut by_name: HashMap<String, String> = HashMap::new();
        let mut missing: Vec<&str> = Vec::new();
        for name in &unique {
            let lowered = normalize(name);
            match self.cached_id(Bucket::Labels, &format!("{}:{}", team_id, lowered)) {
                Some(id) => {
                    by_name.insert(lowered, id);
                }
                None => missing.push(name),
            }
        }

        if !missing.is_empty() {
            debug!(team_id, ?missing, "fetching uncached labels");
            let filter = scoped_to_team(
                team_id,
                FilterClause::field("name", FilterClause::one_of(missing.iter().copied())),
            );
            let params = ListParams::first(missing.len() as u32).filter(filter);
            for label in self.api.issue_labels(&params).await?.nodes {
                let lowered = normalize(&label.name);
                self.remember(
                    Bucket::Labels,
                    &format!("{}:{}", team_id, lowered),
                    CachedValue::Id(label.id.clone()),
                );
                by_name.insert(lowered, label.id);
            }
        }

        let unresolved: Vec<&str> = unique
            .iter()
            .copied()
            .filter(|name| !by_name.contains_key(&normalize(name)))
            .collect();
        if !unresolved.is_empty() {
            return Err(LtuiError::NotFound(format!(
                "Labels not found: {}",
                unresolved.join(", ")
            ))
            .into());
        }

        Ok(names
            .iter()
            .filter_map(|name| by_name.get(&normalize(name)).cloned())
            .collect())
    }

    /// User id for `me`, an email, a name or a UUID
    pub async fn assignee_id(&self, reference: &str) -> Result<Option<String>> {
        let reference = reference.trim();
        if reference == ME {
            return Ok(Some(self.api.viewer().await?.id));
        }

        let lowered = normalize(reference);

        if reference.contains('@') {
            if let Some(id) = self.cached_id(Bucket::Users, &format!("email:{}", lowered)) {
                return Ok(Some(id));
            }
            let params = ListParams::first(1).filter(user_email(reference));
            if let Some(user) = self.api.users(&params).await?.first() {
                self.remember_user(&user.id, user.email.as_deref(), &user.name);
                return Ok(Some(user.id));
            }
            // Fall through: some workspaces use email-like display names
        }

        if let Some(id) = self.cached_id(Bucket::Users, &format!("name:{}", lowered)) {
            return Ok(Some(id));
        }
        let params = ListParams::first(1).filter(user_reference(reference));
        match self.api.users(&params).await?.first() {
            Some(user) => {
                self.remember_user(&user.id, user.email.as_deref(), &user.name);
                Ok(Some(user.id))
            }
            None => Ok(None),
        }
    }

    fn remember_user(&self, id: &str, email: Option<&str>, name: &str) {
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            self.remember(
                Bucket::Users,
                &format!("email:{}", email.to_lowercase()),
                CachedValue::Id(id.to_string()),
            );
        }
        if !name.is_empty() {
            self.remember(
                Bucket::Users,
                &format!("name:{}", name.to_lowercase()),
                CachedValue::Id(id.to_string()),
            );
        }
    }

    /// Issue by id, or by `TEAMKEY-NUMBER`
    pub async fn issue(&self, reference: &str) -> Result<Option<Issue>> {
        let reference = reference.trim();
        match self.api.issue(reference).await {
            Ok(Some(issue)) => return Ok(Some(issue)),
            Ok(None) => {}
            Err(e) => debug!(reference, error = %e, "direct issue lookup failed, trying key"),
        }

        let key: IssueKey = match reference.parse() {
            Ok(key) => key,
            Err(_) => return Ok(None),
        };
        let filter = FilterClause::And(vec![
            FilterClause::field("team", FilterClause::field_eq("key", key.team_key())),
            FilterClause::field_eq("number", key.number()),
        ]);
        Ok(self
            .api
            .issues(&ListParams::first(1).filter(filter))
            .await?
            .first())
    }

    /// Like [`Resolver::team`], but a miss is a `not_found` error
    pub async fn require_team(&self, reference: &str) -> Result<Team> {
        self.team(reference)
            .await?
            .ok_or_else(|| LtuiError::reference("Team", reference).into())
    }

    pub async fn require_project(&self, reference: &str) -> Result<Project> {
        self.project(reference)
            .await?
            .ok_or_else(|| LtuiError::reference("Project", reference).into())
    }

    pub async fn require_workflow_state(
        &self,
        team_id: &str,
        reference: &str,
    ) -> Result<WorkflowState> {
        self.workflow_state(team_id, reference)
            .await?
            .ok_or_else(|| LtuiError::reference("Workflow state", reference).into())
    }

    pub async fn require_assignee(&self, reference: &str) -> Result<String> {
        self.assignee_id(reference)
            .await?
            .ok_or_else(|| LtuiError::reference("Assignee", reference).into())
    }

    pub async fn require_issue(&self, reference: &str) -> Result<Issue> {
        self.issue(reference)
            .await?
            .ok_or_else(|| LtuiError::reference("Issue", reference).into())
    }
}
