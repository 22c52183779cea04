//! On-disk session document
//!
//! Workspaces are keyed by their id as a string so the file stays readable
//! and diffs cleanly. Notepad text is deliberately absent; it lives in the
//! per-workspace `notepad.md` files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use nimbus_workspaces::Workspace;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SessionDocument {
    /// Workspace id ("0".."3") -> workspace record
    #[serde(default)]
    pub workspaces: BTreeMap<String, Workspace>,
    /// Workspace that was focused when the session was written
    #[serde(default)]
    pub active_workspace: usize,
}

impl SessionDocument {
    pub fn workspace(&self, workspace_id: usize) -> Option<&Workspace> {
        self.workspaces.get(&workspace_id.to_string())
    }

    pub fn insert(&mut self, workspace_id: usize, workspace: Workspace) {
        self.workspaces.insert(workspace_id.to_string(), workspace);
    }
}
