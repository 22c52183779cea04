//! Nimbus Filter
//!
//! The shell is a single-site browser: every request a webview makes is
//! checked against a domain allowlist before it leaves the process. OAuth
//! sign-in flows that would wander off the allowlist are handed to the
//! system browser instead.

mod allowlist;
mod error;
mod filter;
mod oauth;

pub use allowlist::DomainAllowlist;
pub use error::FilterError;
pub use filter::{FilterDecision, UrlFilter};
pub use oauth::OauthDetector;

pub type Result<T> = std::result::Result<T, FilterError>;
