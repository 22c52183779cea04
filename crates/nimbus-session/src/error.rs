//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] nimbus_storage::StorageError),

    #[error("Workspace error: {0}")]
    Workspace(#[from] nimbus_workspaces::WorkspaceError),

    #[error("No workspace with id {0}")]
    InvalidWorkspace(usize),
}
