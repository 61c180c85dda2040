//! Document renderers.
//!
//! A [`DocumentRenderer`] opens [`RenderSession`]s. A session loads one page
//! at a time, waits for it to show results, and hands back the content.
//!
//! - [`browser`] - Headless Chromium driven through Playwright
//! - [`http`] - Plain HTTP renderer built on reqwest
//! - [`fixture`] - Canned pages for tests and offline runs

pub mod browser;
pub mod fixture;
pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::document::Document;
use crate::error::RenderError;

pub use browser::BrowserRenderer;
pub use fixture::StaticRenderer;
pub use http::HttpRenderer;

/// Booking sites a renderer may visit by default.
pub const BOOKING_DOMAINS: &[&str] = &["makemytrip.com", "cleartrip.com", "easemytrip.com"];

/// Desktop Chrome on Windows.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

// ============================================================================
// Render Options
// ============================================================================

/// Browser-like settings applied to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Viewport width and height in pixels.
    pub viewport: (u32, u32),
    /// User agent sent with every request.
    pub user_agent: String,
    /// Extra request headers.
    pub extra_headers: Vec<(String, String)>,
    /// Hide automation markers where the renderer supports it.
    pub stealth: bool,
    /// Name of a persistent browser profile, so cookies survive between runs.
    /// `None` starts from a clean profile.
    pub profile: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            viewport: (1920, 1080),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extra_headers: vec![(
                "Accept-Language".to_string(),
                "en-IN,en;q=0.9".to_string(),
            )],
            stealth: false,
            profile: None,
        }
    }
}

impl RenderOptions {
    /// Adds a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Enables stealth mode.
    #[must_use]
    pub fn stealth(mut self) -> Self {
        self.stealth = true;
        self
    }

    /// Uses the named persistent profile.
    #[must_use]
    pub fn with_profile(mut self, name: impl Into<String>) -> Self {
        self.profile = Some(name.into());
        self
    }
}

// ============================================================================
// Ready Signal
// ============================================================================

/// What must be present before a results page counts as loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadySignal {
    /// An element matching a CSS selector.
    Selector(String),
    /// A text fragment in the visible page text.
    Text(String),
}

impl ReadySignal {
    /// Short description used in timeout messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Selector(sel) => format!("selector \"{sel}\""),
            Self::Text(text) => format!("text \"{text}\""),
        }
    }

    /// Returns true if the signal is present in `content`.
    pub fn is_met(&self, content: &str) -> bool {
        match self {
            Self::Selector(sel) => Document::parse(content).has_match(sel),
            Self::Text(text) => Document::parse(content)
                .visible_text()
                .contains(text.as_str()),
        }
    }
}

impl std::fmt::Display for ReadySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

// ============================================================================
// Domain allowlist
// ============================================================================

pub(crate) fn booking_domains() -> Vec<String> {
    BOOKING_DOMAINS.iter().map(ToString::to_string).collect()
}

/// Accepts `url` if its host is one of `allowed` or a subdomain of one.
/// `None` allows everything.
pub(crate) fn check_domain(allowed: Option<&[String]>, url: &Url) -> Result<(), RenderError> {
    let Some(allowed) = allowed else {
        return Ok(());
    };

    let host = url
        .host_str()
        .ok_or_else(|| RenderError::InvalidUrl("No host in URL".to_string()))?;

    let allowed = allowed
        .iter()
        .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

    if allowed {
        Ok(())
    } else {
        Err(RenderError::DomainNotAllowed(host.to_string()))
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Opens render sessions.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Renderer name for logs.
    fn name(&self) -> &str;

    /// Opens a fresh session.
    async fn open(&self, options: &RenderOptions) -> Result<Box<dyn RenderSession>, RenderError>;
}

/// One isolated browsing session.
///
/// Callers must call [`close`](RenderSession::close) when done, whether or not
/// the other calls succeeded.
#[async_trait]
pub trait RenderSession: Send {
    /// Loads `url`, failing with [`RenderError::NavigationTimeout`] after `timeout`.
    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<(), RenderError>;

    /// Waits until `signal` is present, failing with
    /// [`RenderError::WaitTimeout`] after `timeout`.
    async fn wait_for(&mut self, signal: &ReadySignal, timeout: Duration)
    -> Result<(), RenderError>;

    /// Returns the current page content.
    async fn content(&mut self) -> Result<String, RenderError>;

    /// Releases the session.
    async fn close(&mut self) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_signal() {
        let page = r#"<div class="listingCard">IndiGo ₹4,200</div>"#;
        assert!(ReadySignal::Selector(".listingCard".into()).is_met(page));
        assert!(!ReadySignal::Selector(".missing".into()).is_met(page));
        assert!(ReadySignal::Text("₹".into()).is_met(page));
        assert!(!ReadySignal::Text("Flight Details".into()).is_met(page));
        assert_eq!(
            ReadySignal::Selector(".listingCard".into()).describe(),
            "selector \".listingCard\""
        );
    }

    #[test]
    fn test_text_signal_ignores_scripts_and_styles() {
        let signal = ReadySignal::Text("₹".into());
        let loading = r#"<html><head>
            <style>.fare::before { content: "₹"; }</style>
            <script>window.__STATE__ = {"fare": "₹4,200"};</script>
            </head><body><div class="spinner">Loading flights</div></body></html>"#;
        assert!(!signal.is_met(loading));

        let loaded = r#"<html><head>
            <script>window.__STATE__ = {"fare": "₹4,200"};</script>
            </head><body><div class="card">IndiGo ₹4,200</div></body></html>"#;
        assert!(signal.is_met(loaded));
    }

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default()
            .with_header("Referer", "https://x")
            .stealth()
            .with_profile("mmt");
        assert_eq!(options.viewport, (1920, 1080));
        assert!(options.user_agent.contains("Chrome/122"));
        assert!(options.stealth);
        assert_eq!(options.profile.as_deref(), Some("mmt"));
        assert_eq!(RenderOptions::default().profile, None);
        assert_eq!(options.extra_headers.len(), 2);
    }
}
