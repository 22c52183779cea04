//! Workspace commands
use serde::{Deserialize, Serialize};
use tauri::State;

use super::tabs::CommandResult;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub id: usize,
    pub name: String,
    pub tab_count: usize,
    pub active_tab: usize,
    pub notepad_visible: bool,
    pub is_active: bool,
    pub is_suspended: bool,
}

fn workspace_info(
    shell: &nimbus_core::Shell,
    id: usize,
    workspace: &nimbus_core::Workspace,
) -> WorkspaceInfo {
    WorkspaceInfo {
        id,
        name: workspace.name.clone(),
        tab_count: workspace.tab_count(),
        active_tab: workspace.active_tab,
        notepad_visible: workspace.notepad_visible,
        is_active: id == shell.active_workspace_id(),
        is_suspended: shell.is_workspace_suspended(id),
    }
}

#[tauri::command]
pub fn get_workspaces(state: State<AppState>) -> CommandResult<Vec<WorkspaceInfo>> {
    match state.with_shell(|shell| {
        Ok(shell
            .list_workspaces()
            .iter()
            .enumerate()
            .map(|(id, ws)| workspace_info(shell, id, ws))
            .collect())
    }) {
        Ok(workspaces) => CommandResult::ok(workspaces),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn get_active_workspace(state: State<AppState>) -> CommandResult<WorkspaceInfo> {
    match state.with_shell(|shell| {
        let active = shell.active_workspace_id();
        let workspace = shell.active_workspace()?;
        Ok(workspace_info(shell, active, &workspace))
    }) {
        Ok(workspace) => CommandResult::ok(workspace),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn switch_workspace(state: State<AppState>, id: usize) -> CommandResult<WorkspaceInfo> {
    match state.with_shell(|shell| {
        let workspace = shell.switch_workspace(id)?;
        Ok(workspace_info(shell, id, &workspace))
    }) {
        Ok(workspace) => CommandResult::ok(workspace),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn rename_workspace(
    state: State<AppState>,
    id: usize,
    name: String,
) -> CommandResult<WorkspaceInfo> {
    match state.with_shell(|shell| {
        let workspace = shell.rename_workspace(id, name)?;
        Ok(workspace_info(shell, id, &workspace))
    }) {
        Ok(workspace) => CommandResult::ok(workspace),
        Err(e) => CommandResult::err(e.to_string()),
    }
}
