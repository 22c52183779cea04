//! Workspace idle tracking
//!
//! Workspaces that have not been focused for a while get suspended: their
//! webviews are parked on about:blank and the real URLs are remembered here
//! so the next switch can bring them back.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct IdleTracker {
    threshold: Duration,
    last_used: HashMap<usize, Instant>,
    /// Suspended workspace -> (tab id -> parked URL)
    suspended: HashMap<usize, HashMap<String, String>>,
}

impl IdleTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last_used: HashMap::new(),
            suspended: HashMap::new(),
        }
    }

    /// Note that a workspace was focused just now.
    pub fn mark_used(&mut self, workspace_id: usize) {
        self.last_used.insert(workspace_id, Instant::now());
    }

    pub fn is_suspended(&self, workspace_id: usize) -> bool {
        self.suspended.contains_key(&workspace_id)
    }

    /// Workspaces past the idle threshold that are not yet suspended.
    /// The active workspace is never a candidate.
    pub fn idle_candidates(&self, active_workspace: usize) -> Vec<usize> {
        let now = Instant::now();
        self.last_used
            .iter()
            .filter(|(id, last)| {
                **id != active_workspace
                    && !self.suspended.contains_key(*id)
                    && now.duration_since(**last) >= self.threshold
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Record a suspension along with the URLs each tab was parked from.
    pub fn record_suspension(&mut self, workspace_id: usize, parked: HashMap<String, String>) {
        tracing::info!(workspace_id, tabs = parked.len(), "Suspended workspace");
        self.suspended.insert(workspace_id, parked);
    }

    /// Take the parked URLs back for restoration, clearing the suspended
    /// state. `None` when the workspace was not suspended.
    pub fn take_suspended(&mut self, workspace_id: usize) -> Option<HashMap<String, String>> {
        let parked = self.suspended.remove(&workspace_id);
        if parked.is_some() {
            tracing::info!(workspace_id, "Resuming suspended workspace");
        }
        parked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_workspace_not_idle() {
        let mut tracker = IdleTracker::new(Duration::from_secs(300));
        tracker.mark_used(1);
        assert!(tracker.idle_candidates(0).is_empty());
    }

    #[test]
    fn test_zero_threshold_makes_candidates() {
        let mut tracker = IdleTracker::new(Duration::ZERO);
        tracker.mark_used(1);
        tracker.mark_used(2);

        let mut candidates = tracker.idle_candidates(0);
        candidates.sort_unstable();
        assert_eq!(candidates, vec![1, 2]);
    }

    #[test]
    fn test_active_workspace_never_suspends() {
        let mut tracker = IdleTracker::new(Duration::ZERO);
        tracker.mark_used(0);
        assert!(tracker.idle_candidates(0).is_empty());
    }

    #[test]
    fn test_suspend_and_resume() {
        let mut tracker = IdleTracker::new(Duration::ZERO);
        tracker.mark_used(1);

        let parked: HashMap<String, String> =
            [("tab-a".to_string(), "https://chatgpt.com/c/1".to_string())]
                .into_iter()
                .collect();
        tracker.record_suspension(1, parked.clone());

        assert!(tracker.is_suspended(1));
        // Suspended workspaces are no longer candidates
        assert!(tracker.idle_candidates(0).is_empty());

        assert_eq!(tracker.take_suspended(1), Some(parked));
        assert!(!tracker.is_suspended(1));
        assert!(tracker.take_suspended(1).is_none());
    }
}
