//! Configuration handling for ltui
//!
//! Global settings live in the config directory (`$LTUI_CONFIG_DIR`, or the
//! platform config dir):
//!
//! - `config.toml`: default profile and per-profile workspace
//! - `profiles.toml`: API keys, kept apart from the shareable settings
//!
//! Per-project defaults live in `.ltui.toml` in the working directory.
//! Missing or malformed files read as defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::atomic::write_private;
use crate::error::LtuiError;

pub const CONFIG_DIR_ENV: &str = "LTUI_CONFIG_DIR";
pub const PROFILE_ENV: &str = "LTUI_PROFILE";
pub const API_KEY_ENV: &str = "LINEAR_API_KEY";

const PROJECT_CONFIG_FILE: &str = ".ltui.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),
}

/// Workspace settings for one profile
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProfileConfig {
    pub workspace: String,

    /// Entry name in `profiles.toml`
    pub key_ref: String,
}

/// Global user configuration (`config.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GlobalConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    pub profiles: BTreeMap<String, ProfileConfig>,
}

/// A stored credential (`profiles.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StoredKey {
    pub api_key: String,
}

pub type ProfileKeys = BTreeMap<String, StoredKey>;

/// Project-level defaults (`.ltui.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Profile to use inside this project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Team used when a command omits `--team`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Workflow state for new issues
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_issue_state: Option<String>,

    /// Labels prepended to every new issue
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub default_labels: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_assignee: Option<String>,
}

impl ProjectConfig {
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(PROJECT_CONFIG_FILE)
    }

    /// Loads `.ltui.toml` from a directory
    pub fn load(dir: &Path) -> Self {
        read_toml_or_default(&Self::path_in(dir))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        write_toml(&Self::path_in(dir), self).context("Failed to write project config")
    }
}

/// Environment inputs to credential resolution
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub profile: Option<String>,
    pub api_key: Option<String>,
}

impl Environment {
    /// Reads `LTUI_PROFILE` and `LINEAR_API_KEY`, treating empty values as unset
    pub fn from_process() -> Self {
        Self {
            profile: non_empty_var(PROFILE_ENV),
            api_key: non_empty_var(API_KEY_ENV),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Configuration after profile and credential resolution
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Empty when an environment key is used without any profile
    pub profile_name: String,
    pub api_key: String,
    pub global: GlobalConfig,
    pub project: ProjectConfig,
}

/// Files inside the config directory
#[derive(Debug, Clone)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$LTUI_CONFIG_DIR` when set, otherwise the platform config directory
    pub fn discover() -> Result<Self> {
        if let Some(dir) = non_empty_var(CONFIG_DIR_ENV) {
            return Ok(Self::at(dir));
        }
        ProjectDirs::from("dev", "ltui", "ltui")
            .map(|dirs| Self::at(dirs.config_dir()))
            .ok_or_else(|| ConfigError::NoConfigDir.into())
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn global_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn keys_file(&self) -> PathBuf {
        self.root.join("profiles.toml")
    }

    pub fn queries_file(&self) -> PathBuf {
        self.root.join("queries.toml")
    }

    pub fn cache_file(&self) -> PathBuf {
        self.root.join("cache.json")
    }

    pub fn load_global(&self) -> GlobalConfig {
        read_toml_or_default(&self.global_file())
    }

    pub fn save_global(&self, config: &GlobalConfig) -> Result<()> {
        write_toml(&self.global_file(), config).context("Failed to write global config")
    }

    pub fn load_keys(&self) -> ProfileKeys {
        read_toml_or_default(&self.keys_file())
    }

    pub fn save_keys(&self, keys: &ProfileKeys) -> Result<()> {
        write_toml(&self.keys_file(), keys).context("Failed to write profile keys")
    }

    /// Picks the profile and API key for this invocation
    ///
    /// Profile: explicit flag, then project config, then `$LTUI_PROFILE`,
    /// then the global default. A non-empty `$LINEAR_API_KEY` wins over any
    /// stored key.
    pub fn resolve(
        &self,
        explicit_profile: Option<&str>,
        project_dir: &Path,
        env: &Environment,
    ) -> Result<ResolvedConfig, LtuiError> {
        let global = self.load_global();
        let project = ProjectConfig::load(project_dir);

        let profile_name = explicit_profile
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .or_else(|| project.profile.clone())
            .or_else(|| env.profile.clone())
            .or_else(|| global.default_profile.clone())
            .unwrap_or_default();

        if let Some(api_key) = env.api_key.clone() {
            return Ok(ResolvedConfig {
                profile_name,
                api_key,
                global,
                project,
            });
        }

        if profile_name.is_empty() {
            return Err(LtuiError::AuthMissing(format!(
                "No profile configured and {} not set",
                API_KEY_ENV
            )));
        }

        let api_key = self
            .load_keys()
            .remove(&profile_name)
            .map(|stored| stored.api_key)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                LtuiError::AuthMissing(format!(
                    "No API key configured for profile '{}'",
                    profile_name
                ))
            })?;

        Ok(ResolvedConfig {
            profile_name,
            api_key,
            global,
            project,
        })
    }
}

pub(crate) fn read_toml_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return T::default(),
    };
    toml::from_str(&content).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "ignoring malformed config file");
        T::default()
    })
}

pub(crate) fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content =
        toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))?;
    write_private(path, content.as_bytes())
}
