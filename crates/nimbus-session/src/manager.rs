//! Session Manager
//!
//! Owns the four workspaces and their persistence. Mutations mark the
//! session dirty; `save` is cheap to call from timers and lifecycle hooks
//! because it bails out when nothing changed.

use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

use nimbus_storage::SessionStore;
use nimbus_workspaces::{TabRecord, Workspace, WORKSPACE_COUNT};

use crate::document::SessionDocument;
use crate::error::SessionError;
use crate::Result;

struct Inner {
    workspaces: Vec<Workspace>,
    active_workspace: usize,
    session_dirty: bool,
    notepad_dirty: bool,
    /// Bumped on every mutation. `save` clears the dirty flags only when no
    /// mutation landed while the files were being written.
    generation: u64,
    /// When the notepad was last edited, for the flush debounce.
    notepad_edited_at: Option<Instant>,
}

pub struct SessionManager {
    inner: Arc<RwLock<Inner>>,
    store: SessionStore,
    start_url: String,
}

impl SessionManager {
    pub fn new(store: SessionStore, start_url: String) -> Self {
        let workspaces = (0..WORKSPACE_COUNT)
            .map(|id| Workspace::default_for(id, &start_url))
            .collect();

        Self {
            inner: Arc::new(RwLock::new(Inner {
                workspaces,
                active_workspace: 0,
                session_dirty: false,
                notepad_dirty: false,
                generation: 0,
                notepad_edited_at: None,
            })),
            store,
            start_url,
        }
    }

    /// Load the persisted session, falling back to defaults when the file
    /// is missing or unreadable. Always leaves every workspace with at
    /// least one tab and a valid active-tab index.
    pub fn initialize(&self) -> Result<()> {
        let document = match self.store.read_sessions::<SessionDocument>() {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::info!("No session file, starting with default workspaces");
                SessionDocument::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable session file, starting with default workspaces");
                SessionDocument::default()
            }
        };

        let mut workspaces = Vec::with_capacity(WORKSPACE_COUNT);
        for id in 0..WORKSPACE_COUNT {
            let mut workspace = document
                .workspace(id)
                .cloned()
                .unwrap_or_else(|| Workspace::default_for(id, &self.start_url));
            workspace.sanitize(&self.start_url);

            // Notepad text lives in its own file; a missing or unreadable
            // one just means an empty notepad.
            workspace.notepad_content = self
                .store
                .read_notepad(id)
                .unwrap_or_default()
                .unwrap_or_default();

            workspaces.push(workspace);
        }

        let active_workspace = document.active_workspace.min(WORKSPACE_COUNT - 1);

        let mut inner = self.inner.write();
        inner.workspaces = workspaces;
        inner.active_workspace = active_workspace;
        inner.session_dirty = false;
        inner.notepad_dirty = false;
        inner.notepad_edited_at = None;

        tracing::info!(
            active_workspace,
            tab_counts = ?inner.workspaces.iter().map(|w| w.tab_count()).collect::<Vec<_>>(),
            "Session restored"
        );

        Ok(())
    }

    /// Write the session out if anything changed. Returns whether a write
    /// happened. Dirty flags are only cleared after a successful write, and
    /// only when the snapshot that was written is still current.
    pub fn save(&self) -> Result<bool> {
        let snapshot = {
            let inner = self.inner.read();
            if !inner.session_dirty && !inner.notepad_dirty {
                return Ok(false);
            }
            (
                inner.workspaces.clone(),
                inner.active_workspace,
                inner.notepad_dirty,
                inner.generation,
            )
        };
        let (workspaces, active_workspace, notepad_dirty, generation) = snapshot;

        if notepad_dirty {
            for (id, workspace) in workspaces.iter().enumerate() {
                self.store.write_notepad(id, &workspace.notepad_content)?;
            }
        }

        let now = Utc::now();
        let mut document = SessionDocument {
            workspaces: Default::default(),
            active_workspace,
        };
        for (id, workspace) in workspaces.iter().enumerate() {
            let mut entry = workspace.clone();
            entry.last_saved = Some(now);
            document.insert(id, entry);
        }

        self.store.write_sessions(&document)?;

        // A mutation that landed while the files were being written was not
        // part of the snapshot; its dirty flag must survive so the next save
        // picks it up.
        let mut inner = self.inner.write();
        if inner.generation == generation {
            inner.session_dirty = false;
            inner.notepad_dirty = false;
        }

        tracing::debug!("Session saved");
        Ok(true)
    }

    /// Copy the session file aside before risky operations.
    pub fn backup(&self) -> Result<bool> {
        Ok(self.store.backup_sessions()?)
    }

    pub fn is_dirty(&self) -> bool {
        let inner = self.inner.read();
        inner.session_dirty || inner.notepad_dirty
    }

    /// Whether notepad edits are waiting to be flushed and the user has been
    /// quiet for at least `debounce`.
    pub fn notepad_flush_due(&self, debounce: Duration) -> bool {
        let inner = self.inner.read();
        inner.notepad_dirty
            && inner
                .notepad_edited_at
                .is_some_and(|at| at.elapsed() >= debounce)
    }

    // === Workspace access ===

    pub fn active_workspace_id(&self) -> usize {
        self.inner.read().active_workspace
    }

    pub fn workspace(&self, workspace_id: usize) -> Result<Workspace> {
        self.inner
            .read()
            .workspaces
            .get(workspace_id)
            .cloned()
            .ok_or(SessionError::InvalidWorkspace(workspace_id))
    }

    pub fn list_workspaces(&self) -> Vec<Workspace> {
        self.inner.read().workspaces.clone()
    }

    /// Switch focus to another workspace.
    pub fn switch_workspace(&self, workspace_id: usize) -> Result<Workspace> {
        let mut inner = self.inner.write();
        if workspace_id >= inner.workspaces.len() {
            return Err(SessionError::InvalidWorkspace(workspace_id));
        }

        if inner.active_workspace != workspace_id {
            inner.active_workspace = workspace_id;
            inner.session_dirty = true;
            inner.generation += 1;
        }

        let workspace = inner.workspaces[workspace_id].clone();
        tracing::info!(workspace_id, name = %workspace.name, "Switched workspace");
        Ok(workspace)
    }

    pub fn rename_workspace(&self, workspace_id: usize, name: String) -> Result<Workspace> {
        self.with_workspace_mut(workspace_id, |ws| {
            ws.rename(name)?;
            Ok(())
        })?;
        self.workspace(workspace_id)
    }

    // === Tab operations ===

    pub fn new_tab(&self, workspace_id: usize, url: Option<String>) -> Result<TabRecord> {
        let url = url.unwrap_or_else(|| self.start_url.clone());
        let index = self.with_workspace_mut(workspace_id, |ws| Ok(ws.add_tab(url)?))?;
        let tab = self.with_workspace(workspace_id, |ws| Ok(ws.tab(index)?.clone()))?;
        tracing::info!(workspace_id, index, url = %tab.url, "Opened tab");
        Ok(tab)
    }

    pub fn close_tab(&self, workspace_id: usize, index: usize) -> Result<TabRecord> {
        let tab = self.with_workspace_mut(workspace_id, |ws| Ok(ws.close_tab(index)?))?;
        tracing::info!(workspace_id, index, "Closed tab");
        Ok(tab)
    }

    /// Reopen the most recently closed tab. Returns its new index.
    pub fn restore_last_closed_tab(&self, workspace_id: usize) -> Result<usize> {
        self.with_workspace_mut(workspace_id, |ws| Ok(ws.restore_last_closed()?))
    }

    pub fn set_active_tab(&self, workspace_id: usize, index: usize) -> Result<usize> {
        self.with_workspace_mut(workspace_id, |ws| Ok(ws.set_active_tab(index)?))
    }

    pub fn next_tab(&self, workspace_id: usize) -> Result<usize> {
        self.with_workspace_mut(workspace_id, |ws| Ok(ws.next_tab()))
    }

    pub fn previous_tab(&self, workspace_id: usize) -> Result<usize> {
        self.with_workspace_mut(workspace_id, |ws| Ok(ws.previous_tab()))
    }

    pub fn move_tab(&self, workspace_id: usize, from: usize, to: usize) -> Result<()> {
        self.with_workspace_mut(workspace_id, |ws| {
            ws.move_tab(from, to)?;
            Ok(())
        })
    }

    /// Record the title the webview reported for a tab.
    pub fn set_tab_title(&self, workspace_id: usize, tab_id: &str, title: String) -> Result<()> {
        self.with_workspace_mut(workspace_id, |ws| {
            if let Some(index) = ws.find_tab(tab_id) {
                ws.tab_mut(index)?.set_title(title);
            }
            Ok(())
        })
    }

    /// Record where a tab ended up after navigation. The stale title is
    /// dropped with the old URL; the page reports a fresh one once loaded.
    pub fn set_tab_url(&self, workspace_id: usize, tab_id: &str, url: String) -> Result<()> {
        self.with_workspace_mut(workspace_id, |ws| {
            if let Some(index) = ws.find_tab(tab_id) {
                let tab = ws.tab_mut(index)?;
                if tab.url != url {
                    tab.navigate(url)?;
                }
            }
            Ok(())
        })
    }

    /// Locate a tab by its runtime id across all workspaces.
    pub fn find_tab(&self, tab_id: &str) -> Option<(usize, usize)> {
        let inner = self.inner.read();
        inner.workspaces.iter().enumerate().find_map(|(ws_id, ws)| {
            ws.find_tab(tab_id).map(|index| (ws_id, index))
        })
    }

    // === Notepad operations ===

    pub fn notepad_content(&self, workspace_id: usize) -> Result<String> {
        self.with_workspace(workspace_id, |ws| Ok(ws.notepad_content.clone()))
    }

    pub fn set_notepad_content(&self, workspace_id: usize, content: String) -> Result<()> {
        let mut inner = self.inner.write();
        let workspace = inner
            .workspaces
            .get_mut(workspace_id)
            .ok_or(SessionError::InvalidWorkspace(workspace_id))?;

        if workspace.notepad_content != content {
            workspace.notepad_content = content;
            inner.notepad_dirty = true;
            inner.generation += 1;
            inner.notepad_edited_at = Some(Instant::now());
        }
        Ok(())
    }

    /// Flip notepad visibility; returns the new state.
    pub fn toggle_notepad(&self, workspace_id: usize) -> Result<bool> {
        self.with_workspace_mut(workspace_id, |ws| {
            ws.notepad_visible = !ws.notepad_visible;
            Ok(ws.notepad_visible)
        })
    }

    pub fn set_notepad_visible(&self, workspace_id: usize, visible: bool) -> Result<()> {
        self.with_workspace_mut(workspace_id, |ws| {
            ws.notepad_visible = visible;
            Ok(())
        })
    }

    // === Helpers ===

    fn with_workspace<F, T>(&self, workspace_id: usize, f: F) -> Result<T>
    where
        F: FnOnce(&Workspace) -> Result<T>,
    {
        let inner = self.inner.read();
        let workspace = inner
            .workspaces
            .get(workspace_id)
            .ok_or(SessionError::InvalidWorkspace(workspace_id))?;
        f(workspace)
    }

    fn with_workspace_mut<F, T>(&self, workspace_id: usize, f: F) -> Result<T>
    where
        F: FnOnce(&mut Workspace) -> Result<T>,
    {
        let mut inner = self.inner.write();
        let workspace = inner
            .workspaces
            .get_mut(workspace_id)
            .ok_or(SessionError::InvalidWorkspace(workspace_id))?;
        let result = f(workspace)?;
        inner.session_dirty = true;
        inner.generation += 1;
        Ok(result)
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            store: self.store.clone(),
            start_url: self.start_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "https://chatgpt.com";

    fn manager_in(dir: &std::path::Path) -> SessionManager {
        SessionManager::new(
            SessionStore::new(dir.to_path_buf()),
            START.to_string(),
        )
    }

    #[test]
    fn test_initialize_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        let workspaces = manager.list_workspaces();
        assert_eq!(workspaces.len(), WORKSPACE_COUNT);
        for (id, ws) in workspaces.iter().enumerate() {
            assert_eq!(ws.name, format!("Workspace {}", id + 1));
            assert_eq!(ws.tab_count(), 1);
            assert_eq!(ws.tabs[0].url, START);
        }
        assert_eq!(manager.active_workspace_id(), 0);
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_save_skipped_when_clean() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        assert!(!manager.save().unwrap());
        assert!(!dir.path().join("sessions.json").exists());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let manager = manager_in(dir.path());
            manager.initialize().unwrap();

            manager.rename_workspace(1, "Research".to_string()).unwrap();
            manager.new_tab(1, Some(format!("{}/c/abc", START))).unwrap();
            manager.switch_workspace(1).unwrap();
            manager
                .set_notepad_content(1, "remember the thing".to_string())
                .unwrap();
            assert!(manager.save().unwrap());
        }

        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        assert_eq!(manager.active_workspace_id(), 1);
        let ws = manager.workspace(1).unwrap();
        assert_eq!(ws.name, "Research");
        assert_eq!(ws.tab_count(), 2);
        assert_eq!(ws.tabs[1].url, format!("{}/c/abc", START));
        assert_eq!(ws.active_tab, 1);
        assert_eq!(ws.notepad_content, "remember the thing");
        assert!(ws.last_saved.is_some());
    }

    #[test]
    fn test_notepad_saved_to_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        manager
            .set_notepad_content(2, "# workspace three".to_string())
            .unwrap();
        manager.save().unwrap();

        let notepad = dir.path().join("workspace_2").join("notepad.md");
        assert_eq!(
            std::fs::read_to_string(notepad).unwrap(),
            "# workspace three"
        );

        let sessions = std::fs::read_to_string(dir.path().join("sessions.json")).unwrap();
        assert!(!sessions.contains("workspace three"));
    }

    #[test]
    fn test_corrupt_session_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sessions.json"), "{{{{").unwrap();

        let manager = manager_in(dir.path());
        manager.initialize().unwrap();
        assert_eq!(manager.list_workspaces().len(), WORKSPACE_COUNT);
    }

    #[test]
    fn test_partial_document_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("sessions.json"),
            r#"{
                "workspaces": {
                    "2": { "name": "Only one", "tabs": [], "active_tab": 9 }
                },
                "active_workspace": 7
            }"#,
        )
        .unwrap();

        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        // Missing workspaces are recreated with defaults
        assert_eq!(manager.workspace(0).unwrap().name, "Workspace 1");
        // The loaded workspace is repaired: one tab, clamped index
        let ws = manager.workspace(2).unwrap();
        assert_eq!(ws.name, "Only one");
        assert_eq!(ws.tab_count(), 1);
        assert_eq!(ws.active_tab, 0);
        // Out-of-range active workspace is clamped
        assert_eq!(manager.active_workspace_id(), WORKSPACE_COUNT - 1);
    }

    #[test]
    fn test_dirty_flags_cleared_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        manager.new_tab(0, None).unwrap();
        assert!(manager.is_dirty());
        assert!(manager.save().unwrap());
        assert!(!manager.is_dirty());
        assert!(!manager.save().unwrap());
    }

    #[test]
    fn test_invalid_workspace_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        assert!(matches!(
            manager.switch_workspace(WORKSPACE_COUNT),
            Err(SessionError::InvalidWorkspace(_))
        ));
    }

    #[test]
    fn test_find_tab_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        let tab = manager.new_tab(3, None).unwrap();
        assert_eq!(manager.find_tab(&tab.id), Some((3, 1)));
        assert!(manager.find_tab("no-such-tab").is_none());
    }

    #[test]
    fn test_concurrent_edits_survive_save() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        // One thread edits the notepad while another saves in a loop. An
        // edit landing between a save's snapshot and its flag clear must
        // stay dirty so the final save still writes it.
        let writer = manager.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..1000 {
                writer
                    .set_notepad_content(0, format!("note {}", i))
                    .unwrap();
            }
        });

        for _ in 0..1000 {
            manager.save().unwrap();
        }
        handle.join().unwrap();

        if manager.is_dirty() {
            assert!(manager.save().unwrap());
        }
        let disk = std::fs::read_to_string(
            dir.path().join("workspace_0").join("notepad.md"),
        )
        .unwrap();
        assert_eq!(disk, manager.notepad_content(0).unwrap());
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_notepad_flush_waits_for_quiet_period() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        assert!(!manager.notepad_flush_due(Duration::ZERO));

        manager.set_notepad_content(0, "draft".to_string()).unwrap();
        // Still inside the quiet period
        assert!(!manager.notepad_flush_due(Duration::from_secs(60)));
        assert!(manager.notepad_flush_due(Duration::ZERO));

        manager.save().unwrap();
        assert!(!manager.notepad_flush_due(Duration::ZERO));
    }

    #[test]
    fn test_url_change_drops_stale_title() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        let tab = manager.new_tab(0, None).unwrap();
        manager
            .set_tab_title(0, &tab.id, "Old chat".to_string())
            .unwrap();
        manager
            .set_tab_url(0, &tab.id, "https://chatgpt.com/c/next".to_string())
            .unwrap();

        let ws = manager.workspace(0).unwrap();
        assert_eq!(ws.tabs[1].url, "https://chatgpt.com/c/next");
        assert!(ws.tabs[1].title.is_empty());
    }

    #[test]
    fn test_title_update_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(dir.path());
        manager.initialize().unwrap();

        let tab = manager.new_tab(0, None).unwrap();
        manager
            .set_tab_title(0, &tab.id, "New chat".to_string())
            .unwrap();

        let ws = manager.workspace(0).unwrap();
        assert_eq!(ws.tabs[1].title, "New chat");
    }
}
