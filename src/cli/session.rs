//! Per-invocation state
//!
//! A [`Session`] is built once in [`super::run`] after credentials resolve and
//! is passed by reference to every remote command. Offline commands (auth,
//! saved queries, cache) only need the [`crate::storage::ConfigDir`] and [`Output`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use super::output::Output;
use crate::api::{LinearApi, ListParams};
use crate::error::LtuiError;
use crate::resolve::Resolver;
use crate::storage::{CacheStore, ProjectConfig, ResolvedConfig};

pub const DEFAULT_LIMIT: u32 = 20;

/// `--limit` / `--cursor` for list commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paging {
    pub limit: u32,
    pub cursor: Option<String>,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            cursor: None,
        }
    }
}

pub struct Session {
    api: Arc<dyn LinearApi>,
    cache: CacheStore,
    config: ResolvedConfig,
    project_dir: PathBuf,
    output: Output,
    paging: Paging,
}

impl Session {
    pub fn new(
        api: Arc<dyn LinearApi>,
        cache: CacheStore,
        config: ResolvedConfig,
        project_dir: impl Into<PathBuf>,
        output: Output,
        paging: Paging,
    ) -> Self {
        Self {
            api,
            cache,
            config,
            project_dir: project_dir.into(),
            output,
            paging,
        }
    }

    pub fn api(&self) -> &dyn LinearApi {
        self.api.as_ref()
    }

    /// Shared handle for work spawned onto the runtime
    pub fn api_handle(&self) -> Arc<dyn LinearApi> {
        Arc::clone(&self.api)
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.api.as_ref(), &self.cache)
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn defaults(&self) -> &ProjectConfig {
        &self.config.project
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// First page request honoring `--limit` and `--cursor`
    pub fn page(&self) -> ListParams {
        ListParams::first(self.paging.limit).after(self.paging.cursor.clone())
    }
}

/// Literal text, or the contents of `path` for an `@path` value
///
/// Relative paths resolve against `base`.
pub fn read_text_or_path(value: &str, base: &Path) -> Result<String> {
    let Some(path) = value.strip_prefix('@') else {
        return Ok(value.to_string());
    };
    fs::read_to_string(base.join(path))
        .map_err(|_| LtuiError::Validation(format!("Unable to read file '{}'", path)).into())
}
