//! Nimbus Session Management
//!
//! Persistence for the four workspaces: a single `sessions.json` document
//! plus one notepad file per workspace. Saves run on a timer and on
//! lifecycle events, and are skipped when nothing changed. A missing or
//! corrupt session file falls back to the default workspaces.

mod document;
mod error;
mod idle;
mod manager;

pub use document::SessionDocument;
pub use error::SessionError;
pub use idle::IdleTracker;
pub use manager::SessionManager;

pub type Result<T> = std::result::Result<T, SessionError>;
