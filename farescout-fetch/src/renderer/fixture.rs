//! Canned-page renderer.
//!
//! Serves fixed content keyed by URL prefix and can be told to fail at any
//! step. Counts every call so tests can check that sessions were released.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{DocumentRenderer, ReadySignal, RenderOptions, RenderSession};
use crate::error::RenderError;

/// How a [`StaticRenderer`] answers a URL.
#[derive(Debug, Clone)]
pub enum FixtureResponse {
    /// Serve this content.
    Page(String),
    /// Fail navigation with a timeout.
    NavigationTimeout,
    /// Fail navigation with another error.
    NavigationError(String),
    /// Load the page, but never show the ready signal.
    NeverReady(String),
    /// Panic during navigation.
    Panic(String),
}

/// Call counters shared by a renderer and all its sessions.
#[derive(Debug, Default)]
pub struct FixtureStats {
    opened: AtomicUsize,
    navigations: AtomicUsize,
    closed: AtomicUsize,
    visited: Mutex<Vec<String>>,
}

impl FixtureStats {
    /// Sessions opened.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Navigation calls.
    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    /// Sessions closed.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// URLs navigated to, in call order.
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

// ============================================================================
// Static Renderer
// ============================================================================

/// Renderer that never touches the network.
#[derive(Debug, Clone, Default)]
pub struct StaticRenderer {
    routes: Vec<(String, FixtureResponse)>,
    close_fails: bool,
    close_delay: Option<Duration>,
    stats: Arc<FixtureStats>,
}

impl StaticRenderer {
    /// Creates a renderer with no routes. Unknown URLs fail navigation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers URLs starting with `prefix`. Earlier routes win.
    #[must_use]
    pub fn route(mut self, prefix: impl Into<String>, response: FixtureResponse) -> Self {
        self.routes.push((prefix.into(), response));
        self
    }

    /// Serves `content` for URLs starting with `prefix`.
    #[must_use]
    pub fn page(self, prefix: impl Into<String>, content: impl Into<String>) -> Self {
        self.route(prefix, FixtureResponse::Page(content.into()))
    }

    /// Makes every `close` call fail.
    #[must_use]
    pub fn failing_close(mut self) -> Self {
        self.close_fails = true;
        self
    }

    /// Makes every `close` call take `delay`.
    #[must_use]
    pub fn slow_close(mut self, delay: Duration) -> Self {
        self.close_delay = Some(delay);
        self
    }

    /// Shared call counters.
    pub fn stats(&self) -> Arc<FixtureStats> {
        Arc::clone(&self.stats)
    }

    fn lookup(&self, url: &Url) -> Option<FixtureResponse> {
        let url = url.as_str();
        self.routes
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone())
    }
}

#[async_trait]
impl DocumentRenderer for StaticRenderer {
    fn name(&self) -> &str {
        "static"
    }

    async fn open(&self, _options: &RenderOptions) -> Result<Box<dyn RenderSession>, RenderError> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StaticSession {
            renderer: self.clone(),
            current: None,
        }))
    }
}

// ============================================================================
// Static Session
// ============================================================================

struct StaticSession {
    renderer: StaticRenderer,
    current: Option<FixtureResponse>,
}

#[async_trait]
impl RenderSession for StaticSession {
    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<(), RenderError> {
        let stats = &self.renderer.stats;
        stats.navigations.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut visited) = stats.visited.lock() {
            visited.push(url.to_string());
        }

        match self.renderer.lookup(url) {
            Some(FixtureResponse::NavigationTimeout) => Err(RenderError::NavigationTimeout {
                url: url.to_string(),
                timeout,
            }),
            Some(FixtureResponse::NavigationError(detail)) => Err(RenderError::Navigation(detail)),
            Some(FixtureResponse::Panic(message)) => panic!("{message}"),
            Some(response) => {
                self.current = Some(response);
                Ok(())
            }
            None => Err(RenderError::Navigation(format!("No fixture for {url}"))),
        }
    }

    async fn wait_for(
        &mut self,
        signal: &ReadySignal,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        let ready = match &self.current {
            Some(FixtureResponse::Page(content)) => signal.is_met(content),
            Some(_) => false,
            None => return Err(RenderError::NoPage),
        };
        if ready {
            Ok(())
        } else {
            Err(RenderError::WaitTimeout {
                signal: signal.describe(),
                timeout,
            })
        }
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        match &self.current {
            Some(FixtureResponse::Page(content) | FixtureResponse::NeverReady(content)) => {
                Ok(content.clone())
            }
            _ => Err(RenderError::NoPage),
        }
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        if let Some(delay) = self.renderer.close_delay {
            tokio::time::sleep(delay).await;
        }
        self.renderer.stats.closed.fetch_add(1, Ordering::SeqCst);
        self.current = None;
        if self.renderer.close_fails {
            Err(RenderError::Session("Target closed".to_string()))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
