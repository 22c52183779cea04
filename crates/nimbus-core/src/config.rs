//! Shell configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const APP_NAME: &str = "Nimbus";

/// The one site this shell renders.
pub const START_URL: &str = "https://chatgpt.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the application data tree
    pub data_dir: PathBuf,
    /// URL every new tab opens with
    pub start_url: String,
    /// Periodic session save interval
    pub autosave_interval: Duration,
    /// Quiet period before notepad edits are flushed
    pub notepad_save_debounce: Duration,
    /// Focus-free time before a workspace's webviews are suspended
    pub idle_suspend_after: Duration,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            start_url: START_URL.to_string(),
            // Long interval to limit SSD wear; lifecycle events save eagerly
            autosave_interval: Duration::from_secs(10 * 60),
            notepad_save_debounce: Duration::from_secs(2),
            idle_suspend_after: Duration::from_secs(5 * 60),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(nimbus_storage::paths::app_data_dir())
    }
}
