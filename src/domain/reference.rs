//! Reference syntax
//!
//! A reference is whatever the user typed to name an entity: an id, a
//! natural key (team key, project slug, `ENG-42`) or a display name. This
//! module only answers syntactic questions; lookups live in the resolver.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("valid regex")
});

static ISSUE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z0-9]+)-(\d+)$").expect("valid regex"));

/// True when the reference is syntactically a UUID
pub fn is_uuid(value: &str) -> bool {
    UUID.is_match(value)
}

/// Cache key form of a reference: trimmed and lowercased
pub fn normalize(reference: &str) -> String {
    reference.trim().to_lowercase()
}

#[derive(Debug, Error, PartialEq)]
#[error("Invalid issue key: expected 'TEAM-NUMBER', got '{0}'")]
pub struct IssueKeyError(String);

/// Human issue key such as `ENG-42`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueKey {
    team_key: String,
    number: u64,
}

impl IssueKey {
    /// Team key, always uppercased
    pub fn team_key(&self) -> &str {
        &self.team_key
    }

    pub fn number(&self) -> u64 {
        self.number
    }
}

impl FromStr for IssueKey {
    type Err = IssueKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = ISSUE_KEY
            .captures(s)
            .ok_or_else(|| IssueKeyError(s.to_string()))?;
        let number = captures[2]
            .parse::<u64>()
            .map_err(|_| IssueKeyError(s.to_string()))?;

        Ok(Self {
            team_key: captures[1].to_uppercase(),
            number,
        })
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.team_key, self.number)
    }
}
