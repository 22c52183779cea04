//! Notepad commands (active workspace)
use serde::{Deserialize, Serialize};
use tauri::State;

use super::tabs::CommandResult;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct NotepadInfo {
    pub content: String,
    pub visible: bool,
}

#[tauri::command]
pub fn get_notepad(state: State<AppState>) -> CommandResult<NotepadInfo> {
    match state.with_shell(|shell| {
        let workspace_id = shell.active_workspace_id();
        let content = shell.notepad_content(workspace_id)?;
        let visible = shell.active_workspace()?.notepad_visible;
        Ok(NotepadInfo { content, visible })
    }) {
        Ok(notepad) => CommandResult::ok(notepad),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn set_notepad(state: State<AppState>, content: String) -> CommandResult<()> {
    match state.with_shell(|shell| {
        let workspace_id = shell.active_workspace_id();
        shell.set_notepad_content(workspace_id, content)
    }) {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn toggle_notepad(state: State<AppState>) -> CommandResult<bool> {
    match state.with_shell(|shell| {
        let workspace_id = shell.active_workspace_id();
        shell.toggle_notepad(workspace_id)
    }) {
        Ok(visible) => CommandResult::ok(visible),
        Err(e) => CommandResult::err(e.to_string()),
    }
}
