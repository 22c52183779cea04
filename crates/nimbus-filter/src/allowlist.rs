//! User-managed domain allowlist
//!
//! Domains the user has approved beyond the built-in set. Permanent
//! approvals are persisted as a small JSON document; one-time approvals
//! last until the application exits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::Result;

#[derive(Debug, Default, Serialize, Deserialize)]
struct AllowlistDocument {
    #[serde(default)]
    domains: BTreeSet<String>,
}

pub struct DomainAllowlist {
    domains: BTreeSet<String>,
    session_domains: BTreeSet<String>,
    path: Option<PathBuf>,
}

impl DomainAllowlist {
    /// In-memory allowlist, nothing persisted. Used in tests and the
    /// headless self-check.
    pub fn in_memory() -> Self {
        Self {
            domains: BTreeSet::new(),
            session_domains: BTreeSet::new(),
            path: None,
        }
    }

    /// Load the persisted allowlist; a missing or corrupt file yields an
    /// empty list.
    pub fn load(path: PathBuf) -> Self {
        let domains = match nimbus_storage::read_json::<AllowlistDocument>(&path) {
            Ok(Some(doc)) => doc.domains,
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable domain allowlist, starting empty");
                BTreeSet::new()
            }
        };

        Self {
            domains,
            session_domains: BTreeSet::new(),
            path: Some(path),
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(path) = &self.path {
            nimbus_storage::write_json(
                path,
                &AllowlistDocument {
                    domains: self.domains.clone(),
                },
            )?;
        }
        Ok(())
    }

    /// Permanently allow a domain (and its subdomains).
    pub fn add_domain(&mut self, domain: &str) -> Result<()> {
        let domain = domain.trim().to_lowercase();
        if domain.is_empty() || self.domains.contains(&domain) {
            return Ok(());
        }

        self.domains.insert(domain.clone());
        self.save()?;
        tracing::info!(domain = %domain, "Added domain to allowlist");
        Ok(())
    }

    /// Allow a domain until the application exits.
    pub fn add_domain_once(&mut self, domain: &str) {
        let domain = domain.trim().to_lowercase();
        if !domain.is_empty() {
            self.session_domains.insert(domain);
        }
    }

    /// Exact-or-subdomain match against both the permanent and the
    /// session-only sets.
    pub fn contains(&self, host: &str) -> bool {
        self.domains
            .iter()
            .chain(self.session_domains.iter())
            .any(|domain| host == domain || host.ends_with(&format!(".{}", domain)))
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_match() {
        let mut list = DomainAllowlist::in_memory();
        list.add_domain("example.com").unwrap();

        assert!(list.contains("example.com"));
        assert!(list.contains("sub.example.com"));
        assert!(!list.contains("notexample.com"));
    }

    #[test]
    fn test_session_only_allowance() {
        let mut list = DomainAllowlist::in_memory();
        list.add_domain_once("temp.dev");

        assert!(list.contains("temp.dev"));
        // Session-only entries are never listed as permanent
        assert_eq!(list.domains().count(), 0);
    }

    #[test]
    fn test_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domain_allowlist.json");

        let mut list = DomainAllowlist::load(path.clone());
        list.add_domain("Trusted.Example.ORG").unwrap();

        let reloaded = DomainAllowlist::load(path);
        assert!(reloaded.contains("trusted.example.org"));
        assert!(reloaded.contains("www.trusted.example.org"));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domain_allowlist.json");
        std::fs::write(&path, "not json").unwrap();

        let list = DomainAllowlist::load(path);
        assert_eq!(list.domains().count(), 0);
    }
}
