//! OAuth hand-off detection
//!
//! Third-party sign-in (Google) does not work well inside an embedded,
//! allowlisted webview. URLs that look like an OAuth flow are detected here
//! and the shell opens them in the system browser instead.

use url::Url;

const OAUTH_HOSTS: &[&str] = &[
    "accounts.google.com",
    "oauth2.googleapis.com",
    "accounts.youtube.com",
    "oauth.googleusercontent.com",
];

const OAUTH_PATH_KEYWORDS: &[&str] = &["oauth", "auth", "signin", "login"];

pub struct OauthDetector;

impl OauthDetector {
    pub fn new() -> Self {
        Self
    }

    /// True when the URL belongs to an external identity provider and looks
    /// like a sign-in flow.
    pub fn should_open_externally(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };

        let Some(host) = parsed.host_str().map(|h| h.to_lowercase()) else {
            return false;
        };

        if !OAUTH_HOSTS
            .iter()
            .any(|candidate| host == *candidate || host.ends_with(&format!(".{}", candidate)))
        {
            return false;
        }

        let path = parsed.path().to_lowercase();
        if OAUTH_PATH_KEYWORDS.iter().any(|kw| path.contains(kw)) {
            return true;
        }

        let query = parsed.query().unwrap_or("").to_lowercase();
        query.contains("oauth") || query.contains("response_type")
    }
}

impl Default for OauthDetector {
    fn default() -> Self {
        Self::new()
    }
}
