//! Nimbus - Tauri Application
//!
//! Single-site desktop shell for chatgpt.com:
//! - Four isolated workspaces, each with its own storage partition
//! - WebView is content only
//! - Rust owns all state

mod commands;
mod state;

use commands::webview::WebviewManager;
use state::AppState;
use tauri::webview::WebviewBuilder;
use tauri::window::WindowBuilder;
use tauri::{LogicalPosition, LogicalSize, Manager, WebviewUrl, WindowEvent};

/// Run the session self-check without a display and report via exit code.
fn run_headless() -> ! {
    match nimbus_core::Shell::headless_check(nimbus_core::Config::default()) {
        Ok(()) => {
            println!("headless check passed");
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("headless check failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging
    nimbus_core::init_logging();

    let args: Vec<String> = std::env::args().collect();
    let force_gui = args.iter().any(|a| a == "--gui");
    let force_headless = args.iter().any(|a| a == "--headless");

    if force_headless || (!force_gui && nimbus_core::paths::is_headless_environment()) {
        run_headless();
    }

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            // Initialize shell state
            let state = AppState::new()?;
            state.initialize()?;

            let (autosave_interval, notepad_debounce) = state
                .with_shell(|shell| {
                    let config = shell.config();
                    Ok((config.autosave_interval, config.notepad_save_debounce))
                })
                .unwrap_or((
                    std::time::Duration::from_secs(600),
                    std::time::Duration::from_secs(2),
                ));

            // Store state in Tauri
            app.manage(state);

            // Initialize webview manager
            app.manage(WebviewManager::new());

            let window_label = "main";

            let window = WindowBuilder::new(app, window_label)
                .title(nimbus_core::APP_NAME)
                .inner_size(1200.0, 800.0)
                .min_inner_size(800.0, 600.0)
                .center()
                .build()?;

            let ui_webview = WebviewBuilder::new(
                commands::ui_webview_label(window_label),
                WebviewUrl::App("index.html".into()),
            )
            .auto_resize()
            .enable_clipboard_access();

            let ui_webview = window.add_child(
                ui_webview,
                LogicalPosition::new(0.0, 0.0),
                LogicalSize::new(1200.0, 800.0),
            )?;
            let _ = ui_webview.show();

            // Periodic autosave. The first tick fires immediately, skip it.
            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                let mut interval = tokio::time::interval(autosave_interval);
                interval.tick().await;
                loop {
                    interval.tick().await;
                    if let Some(state) = handle.try_state::<AppState>() {
                        match state.with_shell(|shell| shell.save_sessions()) {
                            Ok(wrote) => {
                                tracing::debug!(wrote, "Autosave tick");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Autosave failed");
                            }
                        }
                    }
                }
            });

            // Notepad flush: edits are only written once typing pauses.
            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                let mut interval = tokio::time::interval(notepad_debounce);
                interval.tick().await;
                loop {
                    interval.tick().await;
                    let Some(state) = handle.try_state::<AppState>() else {
                        continue;
                    };
                    let pending = state
                        .with_shell(|shell| Ok(shell.notepad_flush_due()))
                        .unwrap_or(false);
                    if pending {
                        if let Err(e) = state.with_shell(|shell| shell.save_sessions()) {
                            tracing::warn!(error = %e, "Notepad flush failed");
                        }
                    }
                }
            });

            // Idle sweep: park webviews in workspaces nobody has touched.
            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
                interval.tick().await;
                loop {
                    interval.tick().await;
                    commands::webview::suspend_idle_workspaces(&handle);
                }
            });

            tracing::info!("Nimbus started");

            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::CloseRequested { .. } = event {
                if let Some(state) = window.app_handle().try_state::<AppState>() {
                    if let Err(e) = state.with_shell(|shell| shell.save_sessions()) {
                        tracing::warn!(error = %e, "Session save on close failed");
                    }
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            // Workspace commands
            commands::workspaces::get_workspaces,
            commands::workspaces::get_active_workspace,
            commands::workspaces::switch_workspace,
            commands::workspaces::rename_workspace,
            // Tab commands
            commands::tabs::get_tabs,
            commands::tabs::new_tab,
            commands::tabs::close_tab,
            commands::tabs::restore_last_closed_tab,
            commands::tabs::activate_tab,
            commands::tabs::next_tab,
            commands::tabs::previous_tab,
            commands::tabs::move_tab,
            // Notepad commands
            commands::notepad::get_notepad,
            commands::notepad::set_notepad,
            commands::notepad::toggle_notepad,
            // Session commands
            commands::sessions::save_session,
            commands::sessions::backup_session,
            // Filter commands
            commands::filter::check_url,
            commands::filter::allow_domain,
            commands::filter::allow_domain_once,
            commands::filter::get_allowed_domains,
            commands::filter::open_external,
            // Webview commands
            commands::webview::create_webview,
            commands::webview::show_webview,
            commands::webview::activate_workspace_webviews,
            commands::webview::close_webview,
            commands::webview::set_webview_bounds,
            commands::webview::update_all_webview_bounds,
            commands::webview::reload_webview,
            commands::webview::webview_back,
            commands::webview::webview_forward,
        ])
        .run(tauri::generate_context!())
        .expect("error while running Nimbus");
}
