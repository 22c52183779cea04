//! Tab management commands
use serde::{Deserialize, Serialize};
use tauri::State;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: String,
    pub index: usize,
    pub url: String,
    pub title: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

fn tab_infos(workspace: &nimbus_core::Workspace) -> Vec<TabInfo> {
    workspace
        .tabs
        .iter()
        .enumerate()
        .map(|(index, tab)| TabInfo {
            id: tab.id.clone(),
            index,
            url: tab.url.clone(),
            title: tab.display_title().to_string(),
            is_active: index == workspace.active_tab,
        })
        .collect()
}

#[tauri::command]
pub fn get_tabs(state: State<AppState>) -> CommandResult<Vec<TabInfo>> {
    match state.with_shell(|shell| shell.active_workspace()) {
        Ok(workspace) => CommandResult::ok(tab_infos(&workspace)),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn new_tab(state: State<AppState>, url: Option<String>) -> CommandResult<TabInfo> {
    match state.with_shell(|shell| {
        let tab = shell.new_tab(url)?;
        let workspace = shell.active_workspace()?;
        let title = tab.display_title().to_string();
        Ok(TabInfo {
            id: tab.id.clone(),
            index: workspace.active_tab,
            url: tab.url,
            title,
            is_active: true,
        })
    }) {
        Ok(tab) => CommandResult::ok(tab),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn close_tab(state: State<AppState>, index: usize) -> CommandResult<String> {
    match state.with_shell(|shell| shell.close_tab(index)) {
        Ok(tab) => CommandResult::ok(tab.id),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn restore_last_closed_tab(state: State<AppState>) -> CommandResult<usize> {
    match state.with_shell(|shell| shell.restore_last_closed_tab()) {
        Ok(index) => CommandResult::ok(index),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn activate_tab(state: State<AppState>, index: usize) -> CommandResult<usize> {
    match state.with_shell(|shell| shell.activate_tab(index)) {
        Ok(index) => CommandResult::ok(index),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn next_tab(state: State<AppState>) -> CommandResult<usize> {
    match state.with_shell(|shell| shell.next_tab()) {
        Ok(index) => CommandResult::ok(index),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn previous_tab(state: State<AppState>) -> CommandResult<usize> {
    match state.with_shell(|shell| shell.previous_tab()) {
        Ok(index) => CommandResult::ok(index),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn move_tab(state: State<AppState>, from: usize, to: usize) -> CommandResult<()> {
    match state.with_shell(|shell| shell.move_tab(from, to)) {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}
