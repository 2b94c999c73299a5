//! # Command-Line Interface
//!
//! User-facing commands and output rendering.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Issues | Work items | `issues list`, `issues view ENG-1`, `issues update` |
//! | Saved | Named issue filters | `issues saved add --name triage` |
//! | Catalog | Workspace structure | `teams`, `projects`, `labels`, `users`, `cycles` |
//! | Planning | Milestones and roadmaps | `milestones list --project api`, `roadmaps view` |
//! | Documents | Long-form content | `documents list`, `documents view` |
//! | Inbox | The viewer's notifications | `notifications --unread-only` |
//! | Local | No network access | `auth`, `cache clear` |
//!
//! ## Output Formats
//!
//! List commands honor `--format`:
//! - `tsv` (default) - header row plus tab-separated rows
//! - `table` - padded columns
//! - `json` - compact array of objects keyed by column key
//!
//! Every list starts with a `CURSOR_NEXT` / `CURSOR_PREV` / `COUNT`
//! preamble. Single-entity views print `KEY: value` detail blocks.
//!
//! ## Logging
//!
//! Diagnostics go to stderr only. `--verbose` enables debug output for the
//! crate; `LTUI_LOG` takes any `tracing` filter directive:
//! ```bash
//! LTUI_LOG=ltui=trace ltui issues list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod auth;
mod cache_cmd;
mod cycle;
mod document;
mod issue;
mod label;
mod milestone;
mod notification;
mod output;
mod project;
mod roadmap;
mod saved;
mod session;
mod team;
mod user;

pub use app::{execute, run, Cli, Commands, LOG_ENV};
pub use output::{emit_error, Output, OutputFormat};
pub use session::{Paging, Session};
