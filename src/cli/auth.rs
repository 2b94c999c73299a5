//! Profile and credential commands
//!
//! These never contact the API, so they run without a resolved session.

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use tracing::debug;

use super::output::DetailBlock;
use crate::error::LtuiError;
use crate::storage::{ConfigDir, Environment, ProfileConfig, StoredKey};

#[derive(Subcommand)]
pub enum AuthCommands {
    /// List configured profiles
    List,

    /// Add or update the profile named by --profile
    Add {
        /// Workspace slug
        #[arg(long)]
        workspace: Option<String>,

        /// API key (falls back to LINEAR_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Remove the profile named by --profile
    Remove,

    /// Check that credentials resolve
    Test,
}

/// Inputs shared by every auth command
pub struct AuthContext<'a> {
    pub dir: &'a ConfigDir,
    /// Global `--profile`
    pub profile: Option<&'a str>,
    pub env: &'a Environment,
    pub project_dir: &'a Path,
}

pub fn run(cmd: AuthCommands, ctx: &AuthContext<'_>) -> Result<String> {
    match cmd {
        AuthCommands::List => list(ctx.dir),
        AuthCommands::Add { workspace, api_key } => {
            let key = api_key
                .filter(|k| !k.is_empty())
                .or_else(|| ctx.env.api_key.clone());
            add(ctx.dir, required_profile(ctx.profile)?, workspace, key)
        }
        AuthCommands::Remove => remove(ctx.dir, required_profile(ctx.profile)?),
        AuthCommands::Test => {
            let resolved = ctx.dir.resolve(ctx.profile, ctx.project_dir, ctx.env)?;
            Ok(format!(
                "{}\n",
                DetailBlock::new("AUTH_OK").field("PROFILE", resolved.profile_name)
            ))
        }
    }
}

fn required_profile(profile: Option<&str>) -> Result<&str, LtuiError> {
    profile
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| LtuiError::Validation("--profile is required".to_string()))
}

fn list(dir: &ConfigDir) -> Result<String> {
    let global = dir.load_global();
    let keys = dir.load_keys();

    let mut lines = vec!["id\tworkspace\thasKey".to_string()];
    for (name, profile) in &global.profiles {
        let has_key = keys.get(name).is_some_and(|k| !k.api_key.is_empty());
        lines.push(format!("{}\t{}\t{}", name, profile.workspace, has_key));
    }
    Ok(format!("{}\n", lines.join("\n")))
}

fn add(
    dir: &ConfigDir,
    name: &str,
    workspace: Option<String>,
    api_key: Option<String>,
) -> Result<String> {
    let mut global = dir.load_global();
    let existing = global.profiles.remove(name).unwrap_or_else(|| ProfileConfig {
        workspace: String::new(),
        key_ref: name.to_string(),
    });
    let profile = ProfileConfig {
        workspace: workspace.unwrap_or(existing.workspace),
        key_ref: existing.key_ref,
    };
    global.profiles.insert(name.to_string(), profile.clone());
    if global.default_profile.is_none() {
        debug!(profile = name, "first profile becomes the default");
        global.default_profile = Some(name.to_string());
    }
    dir.save_global(&global)?;

    let key_stored = api_key.is_some();
    if let Some(api_key) = api_key {
        let mut keys = dir.load_keys();
        keys.insert(name.to_string(), StoredKey { api_key });
        dir.save_keys(&keys)?;
    }

    let block = DetailBlock::new("PROFILE_SAVED")
        .field("PROFILE", name)
        .field("WORKSPACE", profile.workspace)
        .field("KEY_STORED", key_stored.to_string());
    Ok(format!("{}\n", block))
}

fn remove(dir: &ConfigDir, name: &str) -> Result<String> {
    let mut global = dir.load_global();
    if global.profiles.remove(name).is_some() {
        if global.default_profile.as_deref() == Some(name) {
            global.default_profile = None;
        }
        dir.save_global(&global)?;
    }

    let mut keys = dir.load_keys();
    if keys.remove(name).is_some() {
        dir.save_keys(&keys)?;
    }

    Ok(format!(
        "{}\n",
        DetailBlock::new("PROFILE_REMOVED").field("PROFILE", name)
    ))
}
