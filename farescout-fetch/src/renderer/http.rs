//! Plain HTTP renderer with tracing and a domain allowlist.
//!
//! Fetches server-rendered HTML only; no script runs. Waiting for a ready
//! signal re-fetches the page until the signal shows up or time runs out.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::time::Instant;
use tracing::{debug, instrument, trace};
use url::Url;

use super::{DocumentRenderer, ReadySignal, RenderOptions, RenderSession, booking_domains, check_domain};
use crate::error::RenderError;

/// Delay between ready-signal polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

// ============================================================================
// HTTP Renderer
// ============================================================================

/// Renderer backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    allowed_domains: Option<Vec<String>>,
    poll_interval: Duration,
}

impl HttpRenderer {
    /// Creates a renderer with no domain restrictions.
    pub fn new() -> Self {
        Self {
            allowed_domains: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Creates a renderer restricted to the booking sites.
    pub fn for_booking_sites() -> Self {
        Self::with_allowed_domains(booking_domains())
    }

    /// Creates a renderer that only visits `domains` and their subdomains.
    pub fn with_allowed_domains(domains: Vec<String>) -> Self {
        Self {
            allowed_domains: Some(domains),
            ..Self::new()
        }
    }

    /// Sets the ready-signal poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn is_domain_allowed(&self, url: &Url) -> Result<(), RenderError> {
        check_domain(self.allowed_domains.as_deref(), url)
    }

    fn build_client(options: &RenderOptions) -> Result<Client, RenderError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &options.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RenderError::Session(format!("Bad header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RenderError::Session(format!("Bad header value: {e}")))?;
            headers.insert(name, value);
        }

        Client::builder()
            .user_agent(&options.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(|e| RenderError::Session(format!("Failed to create HTTP client: {e}")))
    }
}

impl Default for HttpRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentRenderer for HttpRenderer {
    fn name(&self) -> &str {
        "http"
    }

    async fn open(&self, options: &RenderOptions) -> Result<Box<dyn RenderSession>, RenderError> {
        if options.stealth {
            trace!("Stealth mode has no effect on the HTTP renderer");
        }
        Ok(Box::new(HttpSession {
            client: Self::build_client(options)?,
            renderer: self.clone(),
            url: None,
            body: None,
        }))
    }
}

// ============================================================================
// HTTP Session
// ============================================================================

struct HttpSession {
    client: Client,
    renderer: HttpRenderer,
    url: Option<Url>,
    body: Option<String>,
}

impl HttpSession {
    async fn fetch(&self, url: &Url) -> Result<String, RenderError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        debug!(status = %status, "Response received");
        if !status.is_success() {
            return Err(RenderError::Navigation(format!("HTTP {status} from {url}")));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl RenderSession for HttpSession {
    #[instrument(skip(self, url), fields(url = %url))]
    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<(), RenderError> {
        self.renderer.is_domain_allowed(url)?;
        debug!("GET request");

        let nav_timeout = || RenderError::NavigationTimeout {
            url: url.to_string(),
            timeout,
        };
        let body = match tokio::time::timeout(timeout, self.fetch(url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(RenderError::Http(e))) if e.is_timeout() => return Err(nav_timeout()),
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(nav_timeout()),
        };

        self.url = Some(url.clone());
        self.body = Some(body);
        Ok(())
    }

    async fn wait_for(
        &mut self,
        signal: &ReadySignal,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        let url = self.url.clone().ok_or(RenderError::NoPage)?;
        let deadline = Instant::now() + timeout;

        loop {
            if self.body.as_deref().is_some_and(|body| signal.is_met(body)) {
                return Ok(());
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(RenderError::WaitTimeout {
                    signal: signal.describe(),
                    timeout,
                });
            }

            tokio::time::sleep(self.renderer.poll_interval.min(deadline - now)).await;
            trace!(signal = %signal, "Polling for ready signal");
            let remaining = deadline.saturating_duration_since(Instant::now());
            if let Ok(Ok(body)) = tokio::time::timeout(remaining, self.fetch(&url)).await {
                self.body = Some(body);
            }
        }
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        self.body.clone().ok_or(RenderError::NoPage)
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.url = None;
        self.body = None;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
