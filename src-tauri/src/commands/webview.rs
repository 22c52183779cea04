//! WebView management commands
//!
//! Handles creating and managing child webviews for tab content. Each
//! tab gets its own child webview within the main window, and every
//! webview in a workspace shares that workspace's storage partition.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tauri::webview::{NewWindowResponse, PageLoadEvent, WebviewBuilder};
use tauri::{AppHandle, Emitter, LogicalPosition, LogicalSize, Manager, WebviewUrl, Window};

use super::tabs::CommandResult;
use crate::state::AppState;

#[derive(Clone, Serialize)]
struct NewWindowRequestPayload {
    url: String,
    source_tab_id: String,
}

#[derive(Clone, Serialize)]
struct BlockedNavigationPayload {
    url: String,
    /// Host of the blocked URL, for "allow this domain" prompts
    host: Option<String>,
    reason: String,
}

/// Registered webview entry: which workspace owns it and its Tauri label.
#[derive(Clone)]
struct WebviewEntry {
    workspace_id: usize,
    label: String,
}

/// Manages webviews for tabs
pub struct WebviewManager {
    /// Map of window_label::tab_id -> webview entry
    webviews: Arc<RwLock<HashMap<String, WebviewEntry>>>,
    /// Current bounds for content area (per window label)
    bounds: Arc<RwLock<HashMap<String, ContentBounds>>>,
}

#[derive(Clone, Copy)]
pub struct ContentBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ContentBounds {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 88.0, // workspace bar + tab strip
            width: 1200.0,
            height: 712.0,
        }
    }
}

impl WebviewManager {
    pub fn new() -> Self {
        Self {
            webviews: Arc::new(RwLock::new(HashMap::new())),
            bounds: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn key(window_label: &str, tab_id: &str) -> String {
        format!("{}::{}", window_label, tab_id)
    }

    pub fn get_webview_label(&self, window_label: &str, tab_id: &str) -> Option<String> {
        self.webviews
            .read()
            .get(&Self::key(window_label, tab_id))
            .map(|entry| entry.label.clone())
    }

    pub fn register_webview(
        &self,
        window_label: &str,
        tab_id: String,
        workspace_id: usize,
        label: String,
    ) {
        self.webviews.write().insert(
            Self::key(window_label, &tab_id),
            WebviewEntry {
                workspace_id,
                label,
            },
        );
    }

    pub fn unregister_webview(&self, window_label: &str, tab_id: &str) -> Option<String> {
        self.webviews
            .write()
            .remove(&Self::key(window_label, tab_id))
            .map(|entry| entry.label)
    }

    pub fn get_all_labels(&self, window_label: &str) -> Vec<String> {
        let prefix = format!("{}::", window_label);
        self.webviews
            .read()
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, entry)| entry.label.clone())
            .collect()
    }

    /// (tab_id, label) pairs for every registered webview in a workspace.
    pub fn workspace_webviews(&self, window_label: &str, workspace_id: usize) -> Vec<(String, String)> {
        let prefix = format!("{}::", window_label);
        self.webviews
            .read()
            .iter()
            .filter(|(key, entry)| {
                key.starts_with(&prefix) && entry.workspace_id == workspace_id
            })
            .map(|(key, entry)| (key[prefix.len()..].to_string(), entry.label.clone()))
            .collect()
    }

    pub fn get_bounds(&self, window_label: &str) -> ContentBounds {
        self.bounds
            .read()
            .get(window_label)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_bounds(&self, window_label: &str, bounds: ContentBounds) {
        self.bounds.write().insert(window_label.to_string(), bounds);
    }
}

impl Default for WebviewManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for WebviewManager {
    fn clone(&self) -> Self {
        Self {
            webviews: Arc::clone(&self.webviews),
            bounds: Arc::clone(&self.bounds),
        }
    }
}

#[tauri::command]
pub async fn create_webview(
    app: AppHandle,
    window: Window,
    workspace_id: usize,
    tab_id: String,
    url: String,
) -> CommandResult<String> {
    let window_label = window.label().to_string();
    let webview_label = format!("content-{}-{}", window_label.as_str(), tab_id.as_str());

    tracing::info!(
        window_label = %window_label,
        workspace_id,
        tab_id = %tab_id,
        url = %url,
        "Create webview requested"
    );

    // Ensure we don't create duplicates
    let manager = match app.try_state::<WebviewManager>() {
        Some(m) => m,
        None => return CommandResult::err("WebviewManager not found".to_string()),
    };

    if let Some(existing_label) = manager.get_webview_label(&window_label, &tab_id) {
        if app.get_webview(&existing_label).is_some() {
            return CommandResult::ok(existing_label);
        }
        manager.unregister_webview(&window_label, &tab_id);
    }

    // Get content bounds from manager
    let bounds = manager.get_bounds(&window_label);

    // Create the webview URL
    let webview_url = if url == "about:blank" || url.is_empty() {
        match "about:blank".parse::<url::Url>() {
            Ok(parsed) => WebviewUrl::External(parsed),
            Err(_) => return CommandResult::err("Invalid about:blank URL".to_string()),
        }
    } else {
        match url.parse::<url::Url>() {
            Ok(parsed) => WebviewUrl::External(parsed),
            Err(_) => return CommandResult::err(format!("Invalid URL: {}", url)),
        }
    };

    let ui_label = super::ui_webview_label(&window_label);

    let app_handle_for_navigation = app.clone();
    let ui_label_for_navigation = ui_label.clone();
    let app_handle_for_load = app.clone();
    let tab_id_for_load = tab_id.clone();
    let ui_label_for_load = ui_label.clone();
    let app_handle_for_title = app.clone();
    let tab_id_for_title = tab_id.clone();
    let ui_label_for_title = ui_label.clone();
    let app_handle_for_new_window = app.clone();
    let ui_label_for_new_window = ui_label.clone();
    let tab_id_for_new_window = tab_id.clone();

    // Per-workspace storage partition: cookies and local storage never
    // cross workspace boundaries.
    let data_directory = match app.try_state::<AppState>() {
        Some(state) => state
            .with_shell(|shell| Ok(shell.workspace_profile_dir(workspace_id)))
            .ok(),
        None => None,
    };

    // Build the child webview
    let mut webview_builder = WebviewBuilder::new(&webview_label, webview_url)
        .transparent(false)
        .auto_resize()
        .enable_clipboard_access();

    if let Some(data_directory) = data_directory {
        webview_builder = webview_builder.data_directory(data_directory);
    }

    let webview_builder = webview_builder
        .on_navigation(move |url| {
            if matches!(url.scheme(), "tauri" | "about") {
                return true;
            }

            let url_str = url.as_str().to_string();
            let Some(state) = app_handle_for_navigation.try_state::<AppState>() else {
                return true;
            };

            // OAuth flows break inside embedded webviews; hand them to the
            // system browser instead of loading them here.
            if let Ok(true) =
                state.with_shell(|shell| Ok(shell.should_open_externally(&url_str)))
            {
                if let Err(e) = tauri_plugin_opener::open_url(&url_str, None::<&str>) {
                    tracing::warn!(url = %url_str, error = %e, "System browser open failed");
                }
                let _ = app_handle_for_navigation.emit_to(
                    ui_label_for_navigation.as_str(),
                    "oauth-redirected",
                    url_str,
                );
                return false;
            }

            let decision = match state.with_shell(|shell| Ok(shell.check_url(&url_str))) {
                Ok(d) => d,
                Err(_) => return true,
            };

            if let Some(reason) = decision.reason() {
                tracing::info!(url = %url_str, reason = %reason, "Navigation blocked");
                let host = nimbus_core::UrlFilter::host_of(&url_str);
                let _ = app_handle_for_navigation.emit_to(
                    ui_label_for_navigation.as_str(),
                    "navigation-blocked",
                    BlockedNavigationPayload {
                        url: url_str,
                        host,
                        reason: reason.to_string(),
                    },
                );
                return false;
            }

            true
        })
        .on_page_load(move |_webview, payload| {
            if matches!(payload.event(), PageLoadEvent::Started) {
                let url = payload.url().to_string();
                if url != "about:blank" {
                    if let Some(state) = app_handle_for_load.try_state::<AppState>() {
                        let _ = state
                            .with_shell(|shell| shell.set_tab_url(&tab_id_for_load, url));
                    }
                }
            }

            let _ = app_handle_for_load.emit_to(ui_label_for_load.as_str(), "tabs-updated", ());
        })
        .on_document_title_changed(move |_webview, title| {
            if let Some(state) = app_handle_for_title.try_state::<AppState>() {
                let _ = state
                    .with_shell(|shell| shell.set_tab_title(&tab_id_for_title, title.clone()));
            }

            let _ = app_handle_for_title.emit_to(ui_label_for_title.as_str(), "tabs-updated", ());
        })
        .on_new_window(move |url, _features| {
            let _ = app_handle_for_new_window.emit_to(
                ui_label_for_new_window.as_str(),
                "new-window-requested",
                NewWindowRequestPayload {
                    url: url.as_str().to_string(),
                    source_tab_id: tab_id_for_new_window.clone(),
                },
            );
            NewWindowResponse::Deny
        });

    // Add as child of the invoking window
    match window.add_child(
        webview_builder,
        LogicalPosition::new(bounds.x, bounds.y),
        LogicalSize::new(bounds.width, bounds.height),
    ) {
        Ok(webview) => {
            // Start hidden
            let _ = webview.hide();

            // Register in manager
            manager.register_webview(
                &window_label,
                tab_id.clone(),
                workspace_id,
                webview_label.clone(),
            );

            tracing::info!(label = %webview_label, tab_id = %tab_id, "Created child webview");
            CommandResult::ok(webview_label)
        }
        Err(e) => {
            tracing::error!(
                label = %webview_label,
                tab_id = %tab_id,
                error = %e,
                "Failed to create child webview"
            );
            CommandResult::err(format!("Failed to create webview: {}", e))
        }
    }
}

#[tauri::command]
pub async fn show_webview(app: AppHandle, window: Window, tab_id: String) -> CommandResult<()> {
    let manager = match app.try_state::<WebviewManager>() {
        Some(m) => m,
        None => return CommandResult::err("WebviewManager not found".to_string()),
    };

    // Hide all other content webviews (but not the UI webview)
    let window_label = window.label();
    let all_labels = manager.get_all_labels(window_label);
    for label in &all_labels {
        if let Some(webview) = app.get_webview(label) {
            let _ = webview.hide();
        }
    }

    // Show the requested webview
    let label = match manager.get_webview_label(window_label, &tab_id) {
        Some(l) => l,
        None => return CommandResult::err(format!("No webview for tab: {}", tab_id)),
    };

    let webview = match app.get_webview(&label) {
        Some(w) => w,
        None => return CommandResult::err(format!("Webview not found: {}", label)),
    };

    match webview.show() {
        Ok(_) => {
            tracing::info!(label = %label, "Showing webview");
            CommandResult::ok(())
        }
        Err(e) => CommandResult::err(format!("Failed to show webview: {}", e)),
    }
}

/// Bring a workspace's webviews forward. If the workspace was suspended,
/// its parked webviews are navigated back to their saved URLs first.
#[tauri::command]
pub async fn activate_workspace_webviews(
    app: AppHandle,
    window: Window,
    workspace_id: usize,
    active_tab_id: String,
) -> CommandResult<()> {
    let manager = match app.try_state::<WebviewManager>() {
        Some(m) => m,
        None => return CommandResult::err("WebviewManager not found".to_string()),
    };

    let window_label = window.label();

    let parked = match app.try_state::<AppState>() {
        Some(state) => state
            .with_shell(|shell| Ok(shell.take_suspended(workspace_id)))
            .ok()
            .flatten(),
        None => None,
    };

    if let Some(parked) = parked {
        for (tab_id, saved_url) in parked {
            let Some(label) = manager.get_webview_label(window_label, &tab_id) else {
                continue;
            };
            let Some(webview) = app.get_webview(&label) else {
                continue;
            };
            if let Ok(parsed) = saved_url.parse::<url::Url>() {
                if let Err(e) = webview.navigate(parsed) {
                    tracing::warn!(label = %label, error = %e, "Resume navigation failed");
                }
            }
        }
        tracing::info!(workspace_id, "Resumed suspended workspace");
    }

    // Hide everything, then show the active tab of the new workspace
    for label in manager.get_all_labels(window_label) {
        if let Some(webview) = app.get_webview(&label) {
            let _ = webview.hide();
        }
    }

    if let Some(label) = manager.get_webview_label(window_label, &active_tab_id) {
        if let Some(webview) = app.get_webview(&label) {
            if let Err(e) = webview.show() {
                return CommandResult::err(format!("Failed to show webview: {}", e));
            }
        }
    }

    CommandResult::ok(())
}

#[tauri::command]
pub async fn close_webview(app: AppHandle, window: Window, tab_id: String) -> CommandResult<()> {
    let manager = match app.try_state::<WebviewManager>() {
        Some(m) => m,
        None => return CommandResult::err("WebviewManager not found".to_string()),
    };

    let label = match manager.unregister_webview(window.label(), &tab_id) {
        Some(l) => l,
        None => return CommandResult::ok(()), // Already closed
    };

    if let Some(webview) = app.get_webview(&label) {
        let _ = webview.close();
    }

    tracing::info!(label = %label, "Closed webview");
    CommandResult::ok(())
}

#[tauri::command]
pub async fn set_webview_bounds(
    app: AppHandle,
    window: Window,
    tab_id: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> CommandResult<()> {
    let manager = match app.try_state::<WebviewManager>() {
        Some(m) => m,
        None => return CommandResult::err("WebviewManager not found".to_string()),
    };

    // Update stored bounds
    let window_label = window.label();
    manager.set_bounds(
        window_label,
        ContentBounds {
            x,
            y,
            width,
            height,
        },
    );

    let label = match manager.get_webview_label(window_label, &tab_id) {
        Some(l) => l,
        None => return CommandResult::err(format!("No webview for tab: {}", tab_id)),
    };

    let webview = match app.get_webview(&label) {
        Some(w) => w,
        None => return CommandResult::err(format!("Webview not found: {}", label)),
    };

    // Position is relative to the parent window
    let position = LogicalPosition::new(x, y);
    let size = LogicalSize::new(width, height);

    if let Err(e) = webview.set_position(position) {
        return CommandResult::err(format!("Failed to set position: {}", e));
    }

    if let Err(e) = webview.set_size(size) {
        return CommandResult::err(format!("Failed to set size: {}", e));
    }

    CommandResult::ok(())
}

/// Update all webview positions when window resizes
#[tauri::command]
pub async fn update_all_webview_bounds(
    app: AppHandle,
    window: Window,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> CommandResult<()> {
    let manager = match app.try_state::<WebviewManager>() {
        Some(m) => m,
        None => return CommandResult::err("WebviewManager not found".to_string()),
    };

    // Update stored bounds
    let window_label = window.label();
    manager.set_bounds(
        window_label,
        ContentBounds {
            x,
            y,
            width,
            height,
        },
    );

    // Position is relative to the parent window
    let position = LogicalPosition::new(x, y);
    let size = LogicalSize::new(width, height);

    // Update all content webviews
    let all_labels = manager.get_all_labels(window_label);
    for label in all_labels {
        if let Some(webview) = app.get_webview(&label) {
            let _ = webview.set_position(position);
            let _ = webview.set_size(size);
        }
    }

    CommandResult::ok(())
}

#[tauri::command]
pub async fn reload_webview(app: AppHandle, window: Window, tab_id: String) -> CommandResult<()> {
    let manager = match app.try_state::<WebviewManager>() {
        Some(m) => m,
        None => return CommandResult::err("WebviewManager not found".to_string()),
    };

    let label = match manager.get_webview_label(window.label(), &tab_id) {
        Some(l) => l,
        None => return CommandResult::err(format!("No webview for tab: {}", tab_id)),
    };

    let webview = match app.get_webview(&label) {
        Some(w) => w,
        None => return CommandResult::err(format!("Webview not found: {}", label)),
    };

    match webview.reload() {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(format!("Reload failed: {}", e)),
    }
}

#[tauri::command]
pub async fn webview_back(app: AppHandle, window: Window, tab_id: String) -> CommandResult<()> {
    let manager = match app.try_state::<WebviewManager>() {
        Some(m) => m,
        None => return CommandResult::err("WebviewManager not found".to_string()),
    };

    let label = match manager.get_webview_label(window.label(), &tab_id) {
        Some(l) => l,
        None => return CommandResult::err(format!("No webview for tab: {}", tab_id)),
    };

    let webview = match app.get_webview(&label) {
        Some(w) => w,
        None => return CommandResult::err(format!("Webview not found: {}", label)),
    };

    match webview.eval("history.back()") {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(format!("Back navigation failed: {}", e)),
    }
}

#[tauri::command]
pub async fn webview_forward(app: AppHandle, window: Window, tab_id: String) -> CommandResult<()> {
    let manager = match app.try_state::<WebviewManager>() {
        Some(m) => m,
        None => return CommandResult::err("WebviewManager not found".to_string()),
    };

    let label = match manager.get_webview_label(window.label(), &tab_id) {
        Some(l) => l,
        None => return CommandResult::err(format!("No webview for tab: {}", tab_id)),
    };

    let webview = match app.get_webview(&label) {
        Some(w) => w,
        None => return CommandResult::err(format!("Webview not found: {}", label)),
    };

    match webview.eval("history.forward()") {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(format!("Forward navigation failed: {}", e)),
    }
}

/// Park webviews in workspaces that have sat idle past the threshold.
/// Their current URLs are recorded so activation can restore them.
pub fn suspend_idle_workspaces(app: &AppHandle) {
    let Some(state) = app.try_state::<AppState>() else {
        return;
    };
    let Some(manager) = app.try_state::<WebviewManager>() else {
        return;
    };

    let candidates = match state.with_shell(|shell| Ok(shell.idle_workspaces())) {
        Ok(ids) => ids,
        Err(_) => return,
    };

    let blank = match "about:blank".parse::<url::Url>() {
        Ok(u) => u,
        Err(_) => return,
    };

    for workspace_id in candidates {
        let mut parked = HashMap::new();

        for window in app.webview_windows().keys() {
            for (tab_id, label) in manager.workspace_webviews(window, workspace_id) {
                let Some(webview) = app.get_webview(&label) else {
                    continue;
                };
                let current = match webview.url() {
                    Ok(u) => u.to_string(),
                    Err(_) => continue,
                };
                if current == "about:blank" {
                    continue;
                }
                if webview.navigate(blank.clone()).is_ok() {
                    parked.insert(tab_id, current);
                }
            }
        }

        if parked.is_empty() {
            continue;
        }

        let count = parked.len();
        let _ = state.with_shell(|shell| {
            shell.record_suspension(workspace_id, parked.clone());
            Ok(())
        });
        tracing::info!(workspace_id, tabs = count, "Suspended idle workspace");
    }
}
