//! Tauri IPC Commands
//!
//! These commands bridge the frontend chrome to the Rust core. The
//! webviews render chatgpt.com; Rust owns all state.

pub mod filter;
pub mod notepad;
pub mod sessions;
pub mod tabs;
pub mod webview;
pub mod workspaces;

pub fn ui_webview_label(window_label: &str) -> String {
    format!("ui-{window_label}")
}
