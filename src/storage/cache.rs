//! File-backed TTL cache for resolved references
//!
//! The cache lives in `cache.json` inside the config directory and maps
//! bucket name to key to `{ value, expiresAt }`, with `expiresAt` in epoch
//! milliseconds. It is loaded lazily on first access, purged of expired
//! entries on every read and write, and rewritten in full (temp file +
//! rename) on every mutation.
//!
//! There is no cross-process coordination: concurrent invocations race on
//! the file and the last writer wins. A missing, unreadable or malformed
//! file reads as an empty cache.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::atomic::write_private;
use crate::domain::Team;

/// TTL for every resolver-populated entry
pub const DEFAULT_TTL_SECONDS: i64 = 300;

/// Cache namespaces, one per entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Bucket {
    Teams,
    Projects,
    WorkflowStates,
    Labels,
    Users,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::Teams,
        Bucket::Projects,
        Bucket::WorkflowStates,
        Bucket::Labels,
        Bucket::Users,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Teams => "teams",
            Bucket::Projects => "projects",
            Bucket::WorkflowStates => "workflowStates",
            Bucket::Labels => "labels",
            Bucket::Users => "users",
        }
    }
}

/// The closed set of values a bucket may hold
///
/// Teams are cached whole; everything that can go stale mid-session is
/// cached as a bare id and re-fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CachedValue {
    Id(String),
    Ids(Vec<String>),
    Team(Team),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub value: CachedValue,
    pub expires_at: i64,
}

type CacheData = BTreeMap<String, BTreeMap<String, CacheEntry>>;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Process-local view of the cache file
pub struct CacheStore {
    path: PathBuf,
    data: Mutex<Option<CacheData>>,
    clock: Clock,
}

impl CacheStore {
    /// Creates a store backed by the given file (not read until first use)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Box::new(Utc::now))
    }

    /// Creates a store with an injected clock
    pub fn with_clock(path: impl Into<PathBuf>, clock: Clock) -> Self {
        Self {
            path: path.into(),
            data: Mutex::new(None),
            clock,
        }
    }

    /// Creates the default store inside a config directory
    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join("cache.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn now_millis(&self) -> i64 {
        (self.clock)().timestamp_millis()
    }

    /// Returns the loaded data, reading the file on first access
    fn loaded(&self) -> MutexGuard<'_, Option<CacheData>> {
        let mut guard = self.data.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_none() {
            *guard = Some(self.read_file());
        }
        guard
    }

    fn read_file(&self) -> CacheData {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "cache file not readable, starting empty");
                return CacheData::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "ignoring malformed cache file");
            CacheData::new()
        })
    }

    fn purge_expired(data: &mut CacheData, now: i64) {
        for entries in data.values_mut() {
            entries.retain(|_, entry| entry.expires_at > now);
        }
        data.retain(|_, entries| !entries.is_empty());
    }

    /// Looks up a live entry
    pub fn get(&self, bucket: Bucket, key: &str) -> Option<CachedValue> {
        let now = self.now_millis();
        let mut guard = self.loaded();
        let data = guard.get_or_insert_with(CacheData::new);
        Self::purge_expired(data, now);
        data.get(bucket.as_str())
            .and_then(|entries| entries.get(key))
            .map(|entry| entry.value.clone())
    }

    /// Inserts or overwrites an entry and persists the whole store
    ///
    /// A TTL of zero or less is a no-op.
    pub fn set(&self, bucket: Bucket, key: &str, value: CachedValue, ttl_seconds: i64) -> Result<()> {
        if ttl_seconds <= 0 {
            return Ok(());
        }

        let now = self.now_millis();
        let mut guard = self.loaded();
        let data = guard.get_or_insert_with(CacheData::new);
        data.entry(bucket.as_str().to_string()).or_default().insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now.saturating_add(ttl_seconds.saturating_mul(1000)),
            },
        );
        Self::purge_expired(data, now);
        self.persist(data)
    }

    /// Removes a whole bucket, persisting only if it existed
    pub fn clear_bucket(&self, bucket: Bucket) -> Result<bool> {
        let mut guard = self.loaded();
        let data = guard.get_or_insert_with(CacheData::new);
        if data.remove(bucket.as_str()).is_none() {
            return Ok(false);
        }
        self.persist(data)?;
        Ok(true)
    }

    /// Number of live entries in a bucket
    pub fn len(&self, bucket: Bucket) -> usize {
        let now = self.now_millis();
        let mut guard = self.loaded();
        let data = guard.get_or_insert_with(CacheData::new);
        Self::purge_expired(data, now);
        data.get(bucket.as_str()).map_or(0, |entries| entries.len())
    }

    /// Rewrites the cache file from the in-memory snapshot
    fn persist(&self, data: &CacheData) -> Result<()> {
        let contents = serde_json::to_vec_pretty(data).context("Failed to serialize cache")?;
        write_private(&self.path, &contents)?;
        debug!(path = %self.path.display(), "cache persisted");
        Ok(())
    }
}
