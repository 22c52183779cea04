//! Nimbus Workspaces
//!
//! The workspace is the unit of isolation: a named set of tabs, an active
//! tab index and a notepad, backed by its own webview storage partition.
//! There are always exactly [`WORKSPACE_COUNT`] workspaces.

mod error;
mod tab;
mod workspace;

pub use error::WorkspaceError;
pub use tab::TabRecord;
pub use workspace::{default_name, Workspace, WORKSPACE_COUNT};

pub type Result<T> = std::result::Result<T, WorkspaceError>;
