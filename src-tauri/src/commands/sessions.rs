//! Session persistence commands
use tauri::State;

use super::tabs::CommandResult;
use crate::state::AppState;

#[tauri::command]
pub fn save_session(state: State<AppState>) -> CommandResult<bool> {
    match state.with_shell(|shell| shell.save_sessions()) {
        Ok(wrote) => CommandResult::ok(wrote),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn backup_session(state: State<AppState>) -> CommandResult<bool> {
    match state.with_shell(|shell| shell.backup_sessions()) {
        Ok(wrote) => CommandResult::ok(wrote),
        Err(e) => CommandResult::err(e.to_string()),
    }
}
