//! Saved issue queries (`queries.toml`)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::config::{read_toml_or_default, write_toml};

/// A named set of issue-list filters
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SavedQuery {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_since: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct QueriesFile {
    queries: BTreeMap<String, SavedQuery>,
}

/// Read/write access to the saved query file
#[derive(Debug, Clone)]
pub struct SavedQueryStore {
    path: PathBuf,
}

impl SavedQueryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> QueriesFile {
        read_toml_or_default(&self.path)
    }

    fn save(&self, file: &QueriesFile) -> Result<()> {
        write_toml(&self.path, file).context("Failed to write saved queries")
    }

    /// All saved queries, sorted by name
    pub fn list(&self) -> Vec<SavedQuery> {
        self.load().queries.into_values().collect()
    }

    pub fn get(&self, name: &str) -> Option<SavedQuery> {
        self.load().queries.remove(name)
    }

    /// Adds or replaces a query under its own name
    pub fn save_query(&self, query: SavedQuery) -> Result<()> {
        let mut file = self.load();
        file.queries.insert(query.name.clone(), query);
        self.save(&file)
    }

    /// Removes a query, returning whether it existed
    pub fn remove(&self, name: &str) -> Result<bool> {
        let mut file = self.load();
        if file.queries.remove(name).is_none() {
            return Ok(false);
        }
        self.save(&file)?;
        Ok(true)
    }
}
