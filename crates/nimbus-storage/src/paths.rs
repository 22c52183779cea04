//! Data directory layout
//!
//! Everything lives under one application data directory:
//!
//! ```text
//! <data dir>/
//!   sessions.json
//!   domain_allowlist.json
//!   workspace_0/
//!     notepad.md
//!     profile/        <- webview storage partition for this workspace
//!   workspace_1/
//!   ...
//! ```

use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "Nimbus";
pub const SESSIONS_FILE: &str = "sessions.json";
pub const ALLOWLIST_FILE: &str = "domain_allowlist.json";
pub const NOTEPAD_FILE: &str = "notepad.md";

/// Platform application data directory, with a dotdir fallback when the
/// platform directories cannot be resolved.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".nimbus"))
                .unwrap_or_else(|| PathBuf::from(".nimbus"))
        })
}

pub fn sessions_file(base: &Path) -> PathBuf {
    base.join(SESSIONS_FILE)
}

pub fn allowlist_file(base: &Path) -> PathBuf {
    base.join(ALLOWLIST_FILE)
}

pub fn workspace_dir(base: &Path, workspace_id: usize) -> PathBuf {
    base.join(format!("workspace_{}", workspace_id))
}

/// Webview storage partition for a workspace. Cookies, local storage and
/// caches for one workspace all live here, isolated from the other
/// workspaces.
pub fn workspace_profile_dir(base: &Path, workspace_id: usize) -> PathBuf {
    workspace_dir(base, workspace_id).join("profile")
}

pub fn workspace_notepad_file(base: &Path, workspace_id: usize) -> PathBuf {
    workspace_dir(base, workspace_id).join(NOTEPAD_FILE)
}

/// Create the data directory tree for the given number of workspaces.
pub fn ensure_directories(base: &Path, workspace_count: usize) -> std::io::Result<()> {
    std::fs::create_dir_all(base)?;
    for id in 0..workspace_count {
        std::fs::create_dir_all(workspace_profile_dir(base, id))?;
    }
    Ok(())
}

/// Detect environments where no GUI can be shown and the application
/// should fall back to the headless self-check.
pub fn is_headless_environment() -> bool {
    if std::env::var_os("HEADLESS").is_some_and(|v| v == "1") {
        return true;
    }

    #[cfg(target_os = "linux")]
    if std::env::var_os("DISPLAY").is_none() && std::env::var_os("WAYLAND_DISPLAY").is_none() {
        return true;
    }

    const CI_INDICATORS: &[&str] = &["CI", "GITHUB_ACTIONS", "TRAVIS", "JENKINS"];
    CI_INDICATORS
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_layout() {
        let base = Path::new("/data/nimbus");
        assert_eq!(
            workspace_dir(base, 2),
            PathBuf::from("/data/nimbus/workspace_2")
        );
        assert_eq!(
            workspace_profile_dir(base, 0),
            PathBuf::from("/data/nimbus/workspace_0/profile")
        );
        assert_eq!(
            workspace_notepad_file(base, 3),
            PathBuf::from("/data/nimbus/workspace_3/notepad.md")
        );
        assert_eq!(
            sessions_file(base),
            PathBuf::from("/data/nimbus/sessions.json")
        );
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        ensure_directories(dir.path(), 4).unwrap();

        for id in 0..4 {
            assert!(workspace_profile_dir(dir.path(), id).is_dir());
        }
    }
}
