//! Application state management
use nimbus_core::{Config, Result, Shell};
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe application state wrapper
pub struct AppState {
    shell: Arc<RwLock<Option<Shell>>>,
}

impl AppState {
    pub fn new() -> Result<Self> {
        let config = Config::default();
        let shell = Shell::new(config)?;

        Ok(Self {
            shell: Arc::new(RwLock::new(Some(shell))),
        })
    }

    pub fn initialize(&self) -> Result<()> {
        if let Some(shell) = self.shell.read().as_ref() {
            shell.initialize()?;
        }
        Ok(())
    }

    pub fn with_shell<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Shell) -> Result<T>,
    {
        let guard = self.shell.read();
        match guard.as_ref() {
            Some(shell) => f(shell),
            None => Err(nimbus_core::CoreError::NotInitialized),
        }
    }
}
