//! Nimbus Storage
//!
//! Data directory layout and plain-JSON persistence. There is no database:
//! the session file and the domain allowlist are small JSON documents that
//! get overwritten in place, and each workspace keeps its notepad text in
//! its own file.

mod error;
pub mod paths;
mod store;

pub use error::StorageError;
pub use store::{read_json, write_json, SessionStore};

pub type Result<T> = std::result::Result<T, StorageError>;
