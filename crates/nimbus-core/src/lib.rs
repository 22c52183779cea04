//! Nimbus Core
//!
//! Central coordination layer for the Nimbus shell: configuration, the
//! aggregate error type, and the `Shell` that the webview layer drives.
//! The webview renders; Rust owns all state.

mod config;
mod error;
mod shell;

pub use config::{Config, APP_NAME, START_URL};
pub use error::CoreError;
pub use shell::Shell;

// Re-export core components
pub use nimbus_filter::{DomainAllowlist, FilterDecision, FilterError, OauthDetector, UrlFilter};
pub use nimbus_session::{IdleTracker, SessionError, SessionManager};
pub use nimbus_storage::{paths, SessionStore, StorageError};
pub use nimbus_workspaces::{TabRecord, Workspace, WorkspaceError, WORKSPACE_COUNT};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
