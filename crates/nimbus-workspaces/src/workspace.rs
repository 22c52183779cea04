//! Workspace data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WorkspaceError;
use crate::tab::TabRecord;
use crate::Result;

/// Fixed number of workspaces. Shortcuts, the session file and the profile
/// directory layout all assume this.
pub const WORKSPACE_COUNT: usize = 4;

pub fn default_name(workspace_id: usize) -> String {
    format!("Workspace {}", workspace_id + 1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    /// Display name
    pub name: String,
    /// Open tabs, in strip order. An empty list is repaired by `sanitize`.
    #[serde(default)]
    pub tabs: Vec<TabRecord>,
    /// Index of the focused tab
    #[serde(default)]
    pub active_tab: usize,
    /// Notepad text; persisted in its own file, not in the session document
    #[serde(skip)]
    pub notepad_content: String,
    /// Whether the notepad pane is open
    #[serde(default)]
    pub notepad_visible: bool,
    /// When this workspace was last written out
    #[serde(default)]
    pub last_saved: Option<DateTime<Utc>>,
    /// Recently closed tabs, newest last. Session-only.
    #[serde(skip)]
    closed_tabs: Vec<TabRecord>,
}

impl Workspace {
    pub fn new(name: String, start_url: &str) -> Self {
        let tab = TabRecord::new(start_url.to_string())
            .expect("start URL is a compile-time constant and never empty");

        Self {
            name,
            tabs: vec![tab],
            active_tab: 0,
            notepad_content: String::new(),
            notepad_visible: false,
            last_saved: None,
            closed_tabs: Vec::new(),
        }
    }

    pub fn default_for(workspace_id: usize, start_url: &str) -> Self {
        Self::new(default_name(workspace_id), start_url)
    }

    /// Repair a workspace loaded from disk: there is always at least one tab
    /// and the active index points inside the tab list.
    pub fn sanitize(&mut self, start_url: &str) {
        if self.tabs.is_empty() {
            if let Ok(tab) = TabRecord::new(start_url.to_string()) {
                self.tabs.push(tab);
            }
        }
        self.active_tab = self.active_tab.min(self.tabs.len().saturating_sub(1));
    }

    pub fn rename(&mut self, name: String) -> Result<()> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(WorkspaceError::EmptyName);
        }
        self.name = name;
        Ok(())
    }

    // === Tab operations ===

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn tab(&self, index: usize) -> Result<&TabRecord> {
        self.tabs.get(index).ok_or(WorkspaceError::TabNotFound(index))
    }

    pub fn tab_mut(&mut self, index: usize) -> Result<&mut TabRecord> {
        self.tabs
            .get_mut(index)
            .ok_or(WorkspaceError::TabNotFound(index))
    }

    /// Open a new tab and focus it. Returns the new tab's index.
    pub fn add_tab(&mut self, url: String) -> Result<usize> {
        let tab = TabRecord::new(url)?;
        self.tabs.push(tab);
        self.active_tab = self.tabs.len() - 1;
        Ok(self.active_tab)
    }

    /// Close the tab at `index`, keeping it around for restoration.
    /// The last remaining tab cannot be closed.
    pub fn close_tab(&mut self, index: usize) -> Result<TabRecord> {
        if self.tabs.len() <= 1 {
            return Err(WorkspaceError::LastTab);
        }
        if index >= self.tabs.len() {
            return Err(WorkspaceError::TabNotFound(index));
        }

        let tab = self.tabs.remove(index);
        self.closed_tabs.push(tab.clone());
        self.active_tab = self.active_tab.min(self.tabs.len() - 1);
        Ok(tab)
    }

    /// Reopen the most recently closed tab and focus it.
    pub fn restore_last_closed(&mut self) -> Result<usize> {
        let tab = self
            .closed_tabs
            .pop()
            .ok_or(WorkspaceError::NoClosedTabs)?;
        self.tabs.push(tab);
        self.active_tab = self.tabs.len() - 1;
        Ok(self.active_tab)
    }

    pub fn set_active_tab(&mut self, index: usize) -> Result<usize> {
        if index >= self.tabs.len() {
            return Err(WorkspaceError::TabNotFound(index));
        }
        self.active_tab = index;
        Ok(index)
    }

    /// Focus the next tab, wrapping around the strip.
    pub fn next_tab(&mut self) -> usize {
        self.active_tab = (self.active_tab + 1) % self.tabs.len();
        self.active_tab
    }

    /// Focus the previous tab, wrapping around the strip.
    pub fn previous_tab(&mut self) -> usize {
        self.active_tab = (self.active_tab + self.tabs.len() - 1) % self.tabs.len();
        self.active_tab
    }

    /// Move a tab to a new position in the strip, keeping focus on it if it
    /// was focused.
    pub fn move_tab(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.tabs.len() {
            return Err(WorkspaceError::TabNotFound(from));
        }

        let was_active = self.active_tab == from;
        let tab = self.tabs.remove(from);
        let to = to.min(self.tabs.len());
        self.tabs.insert(to, tab);

        if was_active {
            self.active_tab = to;
        } else {
            self.active_tab = self.active_tab.min(self.tabs.len() - 1);
        }
        Ok(())
    }

    pub fn find_tab(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    pub fn has_closed_tabs(&self) -> bool {
        !self.closed_tabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "https://chatgpt.com";

    #[test]
    fn test_new_workspace() {
        let ws = Workspace::default_for(0, START);
        assert_eq!(ws.name, "Workspace 1");
        assert_eq!(ws.tab_count(), 1);
        assert_eq!(ws.active_tab, 0);
        assert!(!ws.notepad_visible);
    }

    #[test]
    fn test_add_and_close_tabs() {
        let mut ws = Workspace::default_for(0, START);
        ws.add_tab(format!("{}/c/1", START)).unwrap();
        ws.add_tab(format!("{}/c/2", START)).unwrap();
        assert_eq!(ws.tab_count(), 3);
        assert_eq!(ws.active_tab, 2);

        let closed = ws.close_tab(2).unwrap();
        assert_eq!(closed.url, format!("{}/c/2", START));
        assert_eq!(ws.tab_count(), 2);
        assert_eq!(ws.active_tab, 1);
    }

    #[test]
    fn test_last_tab_cannot_close() {
        let mut ws = Workspace::default_for(0, START);
        assert!(matches!(ws.close_tab(0), Err(WorkspaceError::LastTab)));
    }

    #[test]
    fn test_restore_last_closed() {
        let mut ws = Workspace::default_for(0, START);
        ws.add_tab(format!("{}/c/1", START)).unwrap();
        ws.close_tab(1).unwrap();
        assert!(ws.has_closed_tabs());

        let index = ws.restore_last_closed().unwrap();
        assert_eq!(index, 1);
        assert_eq!(ws.tabs[1].url, format!("{}/c/1", START));
        assert!(matches!(
            Workspace::default_for(0, START).restore_last_closed(),
            Err(WorkspaceError::NoClosedTabs)
        ));
    }

    #[test]
    fn test_tab_cycling_wraps() {
        let mut ws = Workspace::default_for(0, START);
        ws.add_tab(format!("{}/c/1", START)).unwrap();
        ws.add_tab(format!("{}/c/2", START)).unwrap();
        ws.set_active_tab(2).unwrap();

        assert_eq!(ws.next_tab(), 0);
        assert_eq!(ws.previous_tab(), 2);
        assert_eq!(ws.previous_tab(), 1);
    }

    #[test]
    fn test_move_tab_keeps_focus() {
        let mut ws = Workspace::default_for(0, START);
        ws.add_tab(format!("{}/c/1", START)).unwrap();
        ws.add_tab(format!("{}/c/2", START)).unwrap();

        ws.move_tab(2, 0).unwrap();
        assert_eq!(ws.active_tab, 0);
        assert_eq!(ws.tabs[0].url, format!("{}/c/2", START));
    }

    #[test]
    fn test_sanitize_repairs_loaded_state() {
        let mut ws = Workspace::default_for(0, START);
        ws.tabs.clear();
        ws.active_tab = 7;

        ws.sanitize(START);
        assert_eq!(ws.tab_count(), 1);
        assert_eq!(ws.active_tab, 0);
    }

    #[test]
    fn test_rename_rejects_empty() {
        let mut ws = Workspace::default_for(0, START);
        assert!(matches!(
            ws.rename("   ".to_string()),
            Err(WorkspaceError::EmptyName)
        ));
        ws.rename("Research".to_string()).unwrap();
        assert_eq!(ws.name, "Research");
    }
}
