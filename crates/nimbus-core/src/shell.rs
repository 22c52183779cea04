//! Shell coordinator
//!
//! Central state container for the application. The webview layer renders
//! and forwards events; every decision (which tab is live, whether a
//! request may proceed, when to save) is made here.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use nimbus_filter::{FilterDecision, OauthDetector, UrlFilter};
use nimbus_session::{IdleTracker, SessionManager};
use nimbus_storage::{paths, SessionStore};
use nimbus_workspaces::{TabRecord, Workspace, WORKSPACE_COUNT};

use crate::config::Config;
use crate::Result;

pub struct Shell {
    config: Config,
    session_manager: SessionManager,
    filter: Arc<RwLock<UrlFilter>>,
    oauth: OauthDetector,
    idle: Arc<RwLock<IdleTracker>>,
}

impl Shell {
    pub fn new(config: Config) -> Result<Self> {
        paths::ensure_directories(&config.data_dir, WORKSPACE_COUNT)?;

        let store = SessionStore::new(config.data_dir.clone());
        let session_manager = SessionManager::new(store, config.start_url.clone());
        let filter = UrlFilter::with_allowlist(paths::allowlist_file(&config.data_dir));
        let idle = IdleTracker::new(config.idle_suspend_after);

        Ok(Self {
            config,
            session_manager,
            filter: Arc::new(RwLock::new(filter)),
            oauth: OauthDetector::new(),
            idle: Arc::new(RwLock::new(idle)),
        })
    }

    /// Restore the persisted session and mark the restored workspace used.
    pub fn initialize(&self) -> Result<()> {
        self.session_manager.initialize()?;
        self.idle
            .write()
            .mark_used(self.session_manager.active_workspace_id());

        tracing::info!("Shell initialized");
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.session_manager
    }

    // === Workspace operations ===

    pub fn active_workspace_id(&self) -> usize {
        self.session_manager.active_workspace_id()
    }

    pub fn active_workspace(&self) -> Result<Workspace> {
        Ok(self
            .session_manager
            .workspace(self.active_workspace_id())?)
    }

    pub fn list_workspaces(&self) -> Vec<Workspace> {
        self.session_manager.list_workspaces()
    }

    /// Switch workspaces: persist the one being left, then focus the new
    /// one and mark it used for idle tracking.
    pub fn switch_workspace(&self, workspace_id: usize) -> Result<Workspace> {
        // Leaving a workspace is a lifecycle save point; a failed write
        // must not block the switch.
        if let Err(e) = self.session_manager.save() {
            tracing::warn!(error = %e, "Session save on workspace switch failed");
        }

        let workspace = self.session_manager.switch_workspace(workspace_id)?;
        self.idle.write().mark_used(workspace_id);
        Ok(workspace)
    }

    pub fn rename_workspace(&self, workspace_id: usize, name: String) -> Result<Workspace> {
        Ok(self.session_manager.rename_workspace(workspace_id, name)?)
    }

    // === Tab operations (active workspace) ===

    pub fn new_tab(&self, url: Option<String>) -> Result<TabRecord> {
        Ok(self
            .session_manager
            .new_tab(self.active_workspace_id(), url)?)
    }

    pub fn close_tab(&self, index: usize) -> Result<TabRecord> {
        Ok(self
            .session_manager
            .close_tab(self.active_workspace_id(), index)?)
    }

    pub fn restore_last_closed_tab(&self) -> Result<usize> {
        Ok(self
            .session_manager
            .restore_last_closed_tab(self.active_workspace_id())?)
    }

    pub fn activate_tab(&self, index: usize) -> Result<usize> {
        Ok(self
            .session_manager
            .set_active_tab(self.active_workspace_id(), index)?)
    }

    pub fn next_tab(&self) -> Result<usize> {
        Ok(self.session_manager.next_tab(self.active_workspace_id())?)
    }

    pub fn previous_tab(&self) -> Result<usize> {
        Ok(self
            .session_manager
            .previous_tab(self.active_workspace_id())?)
    }

    pub fn move_tab(&self, from: usize, to: usize) -> Result<()> {
        Ok(self
            .session_manager
            .move_tab(self.active_workspace_id(), from, to)?)
    }

    /// Title reported by a webview, addressed by runtime tab id.
    pub fn set_tab_title(&self, tab_id: &str, title: String) -> Result<()> {
        if let Some((workspace_id, _)) = self.session_manager.find_tab(tab_id) {
            self.session_manager
                .set_tab_title(workspace_id, tab_id, title)?;
        }
        Ok(())
    }

    /// URL a webview landed on, addressed by runtime tab id.
    pub fn set_tab_url(&self, tab_id: &str, url: String) -> Result<()> {
        if let Some((workspace_id, _)) = self.session_manager.find_tab(tab_id) {
            self.session_manager
                .set_tab_url(workspace_id, tab_id, url)?;
        }
        Ok(())
    }

    // === Notepad operations ===

    pub fn notepad_content(&self, workspace_id: usize) -> Result<String> {
        Ok(self.session_manager.notepad_content(workspace_id)?)
    }

    pub fn set_notepad_content(&self, workspace_id: usize, content: String) -> Result<()> {
        Ok(self
            .session_manager
            .set_notepad_content(workspace_id, content)?)
    }

    pub fn toggle_notepad(&self, workspace_id: usize) -> Result<bool> {
        Ok(self.session_manager.toggle_notepad(workspace_id)?)
    }

    // === URL filtering and OAuth ===

    pub fn check_url(&self, url: &str) -> FilterDecision {
        self.filter.read().check(url)
    }

    pub fn should_open_externally(&self, url: &str) -> bool {
        self.oauth.should_open_externally(url)
    }

    pub fn allow_domain(&self, domain: &str) -> Result<()> {
        Ok(self.filter.write().allow_domain(domain)?)
    }

    pub fn allow_domain_once(&self, domain: &str) {
        self.filter.write().allow_domain_once(domain);
    }

    pub fn user_allowed_domains(&self) -> Vec<String> {
        self.filter.read().user_domains()
    }

    // === Suspension ===

    /// Workspaces whose webviews should be parked now.
    pub fn idle_workspaces(&self) -> Vec<usize> {
        self.idle.read().idle_candidates(self.active_workspace_id())
    }

    pub fn record_suspension(&self, workspace_id: usize, parked: HashMap<String, String>) {
        self.idle.write().record_suspension(workspace_id, parked);
    }

    pub fn is_workspace_suspended(&self, workspace_id: usize) -> bool {
        self.idle.read().is_suspended(workspace_id)
    }

    /// Parked URLs for a workspace being focused again, if it was suspended.
    pub fn take_suspended(&self, workspace_id: usize) -> Option<HashMap<String, String>> {
        self.idle.write().take_suspended(workspace_id)
    }

    // === Persistence ===

    pub fn save_sessions(&self) -> Result<bool> {
        Ok(self.session_manager.save()?)
    }

    /// Whether notepad edits have sat unflushed past the debounce window.
    pub fn notepad_flush_due(&self) -> bool {
        self.session_manager
            .notepad_flush_due(self.config.notepad_save_debounce)
    }

    pub fn backup_sessions(&self) -> Result<bool> {
        Ok(self.session_manager.backup()?)
    }

    /// Per-workspace webview storage partition.
    pub fn workspace_profile_dir(&self, workspace_id: usize) -> std::path::PathBuf {
        paths::workspace_profile_dir(&self.config.data_dir, workspace_id)
    }

    /// Self-check for headless environments: the session round-trips and
    /// the filter accepts the start URL. Exercises the same code paths the
    /// GUI uses, without a display.
    pub fn headless_check(config: Config) -> Result<()> {
        let shell = Shell::new(config)?;
        shell.initialize()?;

        // Force a write so save failures surface even on a clean session
        let ws = shell.active_workspace_id();
        shell.session_manager.set_notepad_visible(
            ws,
            shell.session_manager.workspace(ws)?.notepad_visible,
        )?;
        shell.save_sessions()?;

        let decision = shell.check_url(&shell.config.start_url);
        if !decision.is_allowed() {
            tracing::error!(url = %shell.config.start_url, "Filter rejects the start URL");
            return Err(crate::CoreError::SelfCheck(
                "filter rejects the start URL".to_string(),
            ));
        }

        tracing::info!("Headless self-check passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn shell_in(dir: &std::path::Path) -> Shell {
        let shell = Shell::new(Config::new(dir.to_path_buf())).unwrap();
        shell.initialize().unwrap();
        shell
    }

    #[test]
    fn test_shell_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let shell = shell_in(dir.path());

        assert_eq!(shell.active_workspace_id(), 0);
        assert_eq!(shell.list_workspaces().len(), WORKSPACE_COUNT);

        let tab = shell.new_tab(None).unwrap();
        assert_eq!(tab.url, "https://chatgpt.com");

        shell.switch_workspace(2).unwrap();
        assert_eq!(shell.active_workspace_id(), 2);

        // The switch persisted the session
        assert!(dir.path().join("sessions.json").exists());
    }

    #[test]
    fn test_tab_ops_follow_active_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let shell = shell_in(dir.path());

        shell.switch_workspace(1).unwrap();
        shell.new_tab(Some("https://chatgpt.com/c/x".to_string())).unwrap();

        assert_eq!(shell.active_workspace().unwrap().tab_count(), 2);
        assert_eq!(
            shell.session_manager().workspace(0).unwrap().tab_count(),
            1
        );

        shell.close_tab(1).unwrap();
        let restored = shell.restore_last_closed_tab().unwrap();
        assert_eq!(restored, 1);
    }

    #[test]
    fn test_filter_wiring() {
        let dir = tempfile::tempdir().unwrap();
        let shell = shell_in(dir.path());

        assert!(shell.check_url("https://chatgpt.com/").is_allowed());
        assert!(!shell.check_url("https://example.com/").is_allowed());

        shell.allow_domain("example.com").unwrap();
        assert!(shell.check_url("https://example.com/").is_allowed());
        assert!(dir.path().join("domain_allowlist.json").exists());
    }

    #[test]
    fn test_oauth_wiring() {
        let dir = tempfile::tempdir().unwrap();
        let shell = shell_in(dir.path());

        assert!(shell.should_open_externally(
            "https://accounts.google.com/o/oauth2/v2/auth?client_id=x"
        ));
        assert!(!shell.should_open_externally("https://chatgpt.com/"));
    }

    #[test]
    fn test_headless_check() {
        let dir = tempfile::tempdir().unwrap();
        Shell::headless_check(Config::new(dir.path().to_path_buf())).unwrap();
        assert!(dir.path().join("sessions.json").exists());
    }

    #[test]
    fn test_suspension_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new(dir.path().to_path_buf());
        config.idle_suspend_after = Duration::ZERO;
        let shell = Shell::new(config).unwrap();
        shell.initialize().unwrap();

        shell.switch_workspace(1).unwrap();
        // Workspace 0 was marked used at initialize and is now idle
        assert_eq!(shell.idle_workspaces(), vec![0]);

        let parked: HashMap<String, String> =
            [("tab".to_string(), "https://chatgpt.com/c/9".to_string())]
                .into_iter()
                .collect();
        shell.record_suspension(0, parked.clone());
        assert!(shell.is_workspace_suspended(0));
        assert!(shell.idle_workspaces().is_empty());

        assert_eq!(shell.take_suspended(0), Some(parked));
        assert!(!shell.is_workspace_suspended(0));
    }
}
