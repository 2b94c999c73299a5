//! # Storage Layer
//!
//! Local persistence for ltui. Nothing here talks to the remote API.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Settings | TOML | `<config dir>/config.toml` |
//! | API keys | TOML | `<config dir>/profiles.toml` |
//! | Saved queries | TOML | `<config dir>/queries.toml` |
//! | Resolver cache | JSON | `<config dir>/cache.json` |
//! | Project defaults | TOML | `./.ltui.toml` |
//!
//! ## Concurrency Safety
//!
//! - Every write is a full rewrite through a locked temp file + rename
//! - Files are created owner-only (0600)
//! - Separate processes are not coordinated; the last writer wins
//!
//! ## Key Types
//!
//! - [`CacheStore`] - TTL cache for resolved references
//! - [`ConfigDir`] - Global config files and credential resolution
//! - [`ProjectConfig`] - Per-directory defaults
//! - [`SavedQueryStore`] - Named issue filters

mod atomic;
mod cache;
mod config;
mod queries;

pub use cache::{Bucket, CacheEntry, CacheStore, CachedValue, DEFAULT_TTL_SECONDS};
pub use config::{
    ConfigDir, ConfigError, Environment, GlobalConfig, ProfileConfig, ProfileKeys,
    ProjectConfig, ResolvedConfig, StoredKey, API_KEY_ENV, CONFIG_DIR_ENV, PROFILE_ENV,
};
pub use queries::{SavedQuery, SavedQueryStore};
