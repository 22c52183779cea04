//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] nimbus_storage::StorageError),

    #[error("Workspace error: {0}")]
    Workspace(#[from] nimbus_workspaces::WorkspaceError),

    #[error("Session error: {0}")]
    Session(#[from] nimbus_session::SessionError),

    #[error("Filter error: {0}")]
    Filter(#[from] nimbus_filter::FilterError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Shell not initialized")]
    NotInitialized,

    #[error("Self-check failed: {0}")]
    SelfCheck(String),
}
