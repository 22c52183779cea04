//! JSON file store
//!
//! All persistence is "overwrite the file": documents are serialized to a
//! temporary file next to the target and renamed over it, so a crash mid-write
//! never leaves a truncated session file behind.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::Result;

/// Read a JSON document, returning `Ok(None)` when the file does not exist.
/// A file that exists but fails to parse is an error; callers decide whether
/// to fall back to defaults.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    Ok(Some(serde_json::from_str(&contents)?))
}

/// Serialize a document and overwrite `path` via a rename.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Handle on the session data directory.
pub struct SessionStore {
    base: PathBuf,
}

impl SessionStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn sessions_path(&self) -> PathBuf {
        paths::sessions_file(&self.base)
    }

    pub fn allowlist_path(&self) -> PathBuf {
        paths::allowlist_file(&self.base)
    }

    pub fn read_sessions<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        read_json(&self.sessions_path())
    }

    pub fn write_sessions<T: Serialize>(&self, document: &T) -> Result<()> {
        write_json(&self.sessions_path(), document)
    }

    /// Notepad text for a workspace, empty-handed when the file is missing.
    pub fn read_notepad(&self, workspace_id: usize) -> Result<Option<String>> {
        let path = paths::workspace_notepad_file(&self.base, workspace_id);
        match std::fs::read_to_string(&path) {
            Ok(c) => Ok(Some(c)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write_notepad(&self, workspace_id: usize, content: &str) -> Result<()> {
        let path = paths::workspace_notepad_file(&self.base, workspace_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Copy the session file aside. Returns `false` when there is nothing
    /// to back up yet.
    pub fn backup_sessions(&self) -> Result<bool> {
        let path = self.sessions_path();
        if !path.exists() {
            return Ok(false);
        }

        let backup = path.with_extension("backup.json");
        std::fs::copy(&path, &backup)?;
        tracing::debug!(path = %backup.display(), "Backed up session file");
        Ok(true)
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        let doc = Doc {
            name: "alpha".to_string(),
            count: 3,
        };
        write_json(&path, &doc).unwrap();

        let loaded: Option<Doc> = read_json(&path).unwrap();
        assert_eq!(loaded, Some(doc));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Option<Doc> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let loaded: Result<Option<Doc>> = read_json(&path);
        assert!(loaded.is_err());
    }

    #[test]
    fn test_notepad_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());

        assert!(store.read_notepad(0).unwrap().is_none());

        store.write_notepad(0, "# Notes\n- first").unwrap();
        assert_eq!(
            store.read_notepad(0).unwrap().as_deref(),
            Some("# Notes\n- first")
        );

        // Other workspaces are untouched
        assert!(store.read_notepad(1).unwrap().is_none());
    }

    #[test]
    fn test_backup_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().to_path_buf());

        // Nothing persisted yet
        assert!(!store.backup_sessions().unwrap());

        store
            .write_sessions(&Doc {
                name: "session".to_string(),
                count: 1,
            })
            .unwrap();
        assert!(store.backup_sessions().unwrap());
        assert!(dir.path().join("sessions.backup.json").exists());
    }
}
