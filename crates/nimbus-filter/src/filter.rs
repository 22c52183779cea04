//! Request filter
//!
//! Positive allowlist in three layers: URL prefixes the engine needs
//! (`data:`, `blob:`, `about:blank`), an http(s)-only scheme check, and a
//! domain allowlist of the site plus the auth and CDN hosts it pulls from.
//! Everything else is blocked with a reason the UI can surface.

use std::collections::BTreeSet;
use std::path::PathBuf;
use url::Url;

use crate::allowlist::DomainAllowlist;
use crate::Result;

/// Hosts chatgpt.com needs to function: the site itself, the OpenAI
/// auth endpoints, and the CDNs serving its static assets.
const BUILTIN_DOMAINS: &[&str] = &[
    "chatgpt.com",
    // OAuth and login flows
    "auth0.openai.com",
    "auth.openai.com",
    "login.openai.com",
    "openai.auth0.com",
    // API and CDN
    "cdn.openai.com",
    "static.openai.com",
    "api.openai.com",
    "files.oaiusercontent.com",
    "cdn.oaistatic.com",
    "oaistatic.com",
    "cdnjs.cloudflare.com",
    "chat.openai.com.cdn.cloudflare.net",
    "openaiapi-site.azureedge.net",
    "openaicomproductionae4b.blob.core.windows.net",
    // Voice features
    "chatgpt.livekit.cloud",
];

/// Non-network URLs the rendering engine produces on its own.
const ALLOWED_PREFIXES: &[&str] = &["data:", "blob:", "about:blank"];

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "about"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Allow,
    Block { reason: String },
}

impl FilterDecision {
    fn block(reason: impl Into<String>) -> Self {
        Self::Block {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Block { reason } => Some(reason),
        }
    }
}

pub struct UrlFilter {
    builtin: BTreeSet<&'static str>,
    allowlist: DomainAllowlist,
}

impl UrlFilter {
    /// Filter with the built-in domains only, nothing persisted.
    pub fn new() -> Self {
        Self {
            builtin: BUILTIN_DOMAINS.iter().copied().collect(),
            allowlist: DomainAllowlist::in_memory(),
        }
    }

    /// Filter backed by the persisted user allowlist at `path`.
    pub fn with_allowlist(path: PathBuf) -> Self {
        Self {
            builtin: BUILTIN_DOMAINS.iter().copied().collect(),
            allowlist: DomainAllowlist::load(path),
        }
    }

    /// Decide whether a request may proceed.
    pub fn check(&self, url: &str) -> FilterDecision {
        if url.is_empty() {
            return FilterDecision::block("Empty URL");
        }

        for prefix in ALLOWED_PREFIXES {
            if url.starts_with(prefix) {
                return FilterDecision::Allow;
            }
        }

        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => return FilterDecision::block(format!("Invalid URL: {}", e)),
        };

        let scheme = parsed.scheme();
        if !ALLOWED_SCHEMES.contains(&scheme) {
            return FilterDecision::block(format!("Scheme '{}' not allowed", scheme));
        }

        // about:blank passed the prefix check above; every other about: page
        // is engine-internal and stays blocked.
        if scheme == "about" {
            return FilterDecision::block("Internal pages are blocked");
        }

        let host = match parsed.host_str() {
            Some(h) => h.to_lowercase(),
            None => return FilterDecision::block("URL has no host"),
        };

        if self.host_allowed(&host) {
            FilterDecision::Allow
        } else {
            FilterDecision::block(format!("Domain '{}' not in allowlist", host))
        }
    }

    fn host_allowed(&self, host: &str) -> bool {
        let builtin = self
            .builtin
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)));

        builtin || self.allowlist.contains(host)
    }

    /// Permanently allow an extra domain.
    pub fn allow_domain(&mut self, domain: &str) -> Result<()> {
        self.allowlist.add_domain(domain)
    }

    /// Allow an extra domain for this run only.
    pub fn allow_domain_once(&mut self, domain: &str) {
        self.allowlist.add_domain_once(domain);
    }

    pub fn user_domains(&self) -> Vec<String> {
        self.allowlist.domains().map(str::to_string).collect()
    }

    /// Host portion of a URL, for prompts about blocked domains.
    pub fn host_of(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
    }
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_and_subdomains_allowed() {
        let filter = UrlFilter::new();
        assert!(filter.check("https://chatgpt.com/").is_allowed());
        assert!(filter.check("https://chatgpt.com/c/abc123").is_allowed());
        assert!(filter.check("https://cdn.oaistatic.com/assets/app.js").is_allowed());
        assert!(filter.check("https://auth0.openai.com/authorize").is_allowed());
    }

    #[test]
    fn test_unknown_domain_blocked_with_reason() {
        let filter = UrlFilter::new();
        let decision = filter.check("https://example.com/page");
        assert!(!decision.is_allowed());
        assert_eq!(decision.reason(), Some("Domain 'example.com' not in allowlist"));
    }

    #[test]
    fn test_lookalike_domain_blocked() {
        let filter = UrlFilter::new();
        assert!(!filter.check("https://evilchatgpt.com/").is_allowed());
        assert!(!filter.check("https://chatgpt.com.evil.net/").is_allowed());
    }

    #[test]
    fn test_engine_internal_urls() {
        let filter = UrlFilter::new();
        assert!(filter.check("about:blank").is_allowed());
        assert!(filter.check("data:image/png;base64,AAAA").is_allowed());
        assert!(filter.check("blob:https://chatgpt.com/uuid").is_allowed());
        assert!(!filter.check("about:config").is_allowed());
    }

    #[test]
    fn test_scheme_allowlist() {
        let filter = UrlFilter::new();
        assert!(!filter.check("ftp://chatgpt.com/file").is_allowed());
        assert!(!filter.check("file:///etc/passwd").is_allowed());
        assert!(!filter.check("javascript:alert(1)").is_allowed());
    }

    #[test]
    fn test_empty_url_blocked() {
        let filter = UrlFilter::new();
        assert!(!filter.check("").is_allowed());
    }

    #[test]
    fn test_user_allowed_domains() {
        let mut filter = UrlFilter::new();
        assert!(!filter.check("https://docs.example.io/").is_allowed());

        filter.allow_domain_once("docs.example.io");
        assert!(filter.check("https://docs.example.io/").is_allowed());
    }

    #[test]
    fn test_host_of() {
        assert_eq!(
            UrlFilter::host_of("https://ChatGPT.com/c/1").as_deref(),
            Some("chatgpt.com")
        );
        assert!(UrlFilter::host_of("not a url").is_none());
    }
}
