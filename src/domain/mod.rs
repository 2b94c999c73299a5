//! Domain models for ltui
//!
//! Entity shapes, reference syntax and filter trees, without any I/O.

mod entity;
mod reference;
pub mod filter;

pub use entity::{
    Attachment, Comment, Cycle, Document, HistoryEntry, Issue, Label, LabelNodes, Milestone,
    NamedRef, Notification, Project, Roadmap, Team, TeamRef, User, WorkflowState,
};
pub use filter::FilterClause;
pub use reference::{is_uuid, normalize, IssueKey, IssueKeyError};
