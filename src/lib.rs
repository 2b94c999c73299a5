//! ltui - a token-efficient Linear client for AI coding agents
//!
//! Output is plain text built for agents: tab-separated lists behind a
//! pagination preamble, `KEY: value` detail blocks, and one-line
//! `ERROR: <code> <message>` failures on stderr. References (team keys,
//! project slugs, state and label names, `me`) are resolved to ids through
//! a small on-disk TTL cache.

pub mod api;
pub mod cli;
pub mod domain;
pub mod error;
pub mod resolve;
pub mod storage;

#[cfg(test)]
mod testsupport;

pub use error::{classify, ErrorCode, ErrorRecord, LtuiError};
