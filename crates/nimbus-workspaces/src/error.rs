//! Workspace error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Tab not found at index {0}")]
    TabNotFound(usize),

    #[error("Cannot close the last tab")]
    LastTab,

    #[error("No recently closed tabs to restore")]
    NoClosedTabs,

    #[error("Workspace name cannot be empty")]
    EmptyName,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
