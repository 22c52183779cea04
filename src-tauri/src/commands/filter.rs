//! URL filter commands
use serde::{Deserialize, Serialize};
use tauri::State;

use super::tabs::CommandResult;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct UrlCheck {
    pub allowed: bool,
    pub reason: Option<String>,
}

#[tauri::command]
pub fn check_url(state: State<AppState>, url: String) -> CommandResult<UrlCheck> {
    match state.with_shell(|shell| {
        let decision = shell.check_url(&url);
        Ok(UrlCheck {
            allowed: decision.is_allowed(),
            reason: decision.reason().map(String::from),
        })
    }) {
        Ok(check) => CommandResult::ok(check),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn allow_domain(state: State<AppState>, domain: String) -> CommandResult<()> {
    match state.with_shell(|shell| shell.allow_domain(&domain)) {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn allow_domain_once(state: State<AppState>, domain: String) -> CommandResult<()> {
    match state.with_shell(|shell| {
        shell.allow_domain_once(&domain);
        Ok(())
    }) {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

#[tauri::command]
pub fn get_allowed_domains(state: State<AppState>) -> CommandResult<Vec<String>> {
    match state.with_shell(|shell| Ok(shell.user_allowed_domains())) {
        Ok(domains) => CommandResult::ok(domains),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Hand a URL to the system browser. Used for OAuth flows that refuse to
/// run inside an embedded webview.
#[tauri::command]
pub fn open_external(url: String) -> CommandResult<()> {
    match tauri_plugin_opener::open_url(&url, None::<&str>) {
        Ok(()) => {
            tracing::info!(url = %url, "Opened URL in system browser");
            CommandResult::ok(())
        }
        Err(e) => CommandResult::err(format!("Failed to open URL: {}", e)),
    }
}
