//! Tab record
//!
//! Only the URL and title are persisted; the id exists so the webview layer
//! can address a tab while it is open, and a fresh one is minted whenever a
//! session is restored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkspaceError;
use crate::Result;

fn new_tab_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabRecord {
    /// Runtime identifier, never written to the session file
    #[serde(skip, default = "new_tab_id")]
    pub id: String,
    /// Current URL
    pub url: String,
    /// Page title as last reported by the webview
    #[serde(default)]
    pub title: String,
}

impl TabRecord {
    pub fn new(url: String) -> Result<Self> {
        if url.is_empty() {
            return Err(WorkspaceError::InvalidUrl("URL cannot be empty".to_string()));
        }

        Ok(Self {
            id: new_tab_id(),
            url,
            title: String::new(),
        })
    }

    /// Point the tab at a new URL; the title resets until the page reports one.
    pub fn navigate(&mut self, url: String) -> Result<()> {
        if url.is_empty() {
            return Err(WorkspaceError::InvalidUrl("URL cannot be empty".to_string()));
        }

        self.url = url;
        self.title = String::new();
        Ok(())
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    /// Title for tab strips, with fallback to the URL
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}
