//! Source adapters.
//!
//! A [`SourceAdapter`] turns a query into a [`SourceOutcome`] and never
//! fails. [`SiteAdapter`] implements it once for every booking site: the
//! site supplies a [`SourceSite`] describing its URL scheme, readiness signal,
//! timeouts and extractor, and the adapter drives a render session through
//! navigate, block check, wait, settle, read, and extract.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

use farescout_core::{AirportTable, FlightQuery, FlightRecord, SourceId, SourceOutcome};

use crate::artifacts::RecordDump;
use crate::context::FetchContext;
use crate::error::AdapterError;
use crate::extract::Extractor;
use crate::renderer::{ReadySignal, RenderOptions, RenderSession};

// ============================================================================
// Traits
// ============================================================================

/// Fetches flights for a query from one source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which source this adapter queries.
    fn source(&self) -> SourceId;

    /// Fetches and extracts flights. Every failure is folded into the outcome.
    async fn fetch(&self, query: &FlightQuery, ctx: &FetchContext) -> SourceOutcome;
}

/// Everything that differs between booking sites.
pub trait SourceSite: Send + Sync {
    /// Which source this site is.
    fn source(&self) -> SourceId;

    /// Builds the search URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built from the query.
    fn request_url(&self, query: &FlightQuery, airports: &AirportTable)
    -> Result<Url, AdapterError>;

    /// What marks the results as loaded.
    fn ready_signal(&self) -> ReadySignal;

    /// Time allowed for navigation.
    fn navigation_timeout(&self) -> Duration;

    /// Time allowed for the ready signal.
    fn ready_timeout(&self) -> Duration;

    /// Pause after the ready signal, for late-rendering content.
    fn settle_delay(&self) -> Duration {
        Duration::ZERO
    }

    /// Session options.
    fn render_options(&self) -> RenderOptions {
        RenderOptions::default()
    }

    /// Extraction rules for this site's result pages.
    fn extractor(&self) -> &Extractor;

    /// Returns a reason if `content` is an anti-bot or error page.
    fn detect_block(&self, _content: &str) -> Option<String> {
        None
    }
}

// ============================================================================
// Site Adapter
// ============================================================================

/// Generic [`SourceAdapter`] over a [`SourceSite`].
#[derive(Debug)]
pub struct SiteAdapter<S> {
    site: S,
}

impl<S: SourceSite> SiteAdapter<S> {
    /// Wraps a site.
    pub fn new(site: S) -> Self {
        Self { site }
    }

    /// The wrapped site.
    pub fn site(&self) -> &S {
        &self.site
    }

    async fn drive(
        &self,
        session: &mut dyn RenderSession,
        url: &Url,
        query: &FlightQuery,
        ctx: &FetchContext,
    ) -> Result<Vec<FlightRecord>, AdapterError> {
        let source = self.site.source();
        let settings = &ctx.settings;

        let nav_timeout = settings
            .navigation_timeout
            .unwrap_or_else(|| self.site.navigation_timeout());
        debug!(timeout = ?nav_timeout, "Navigating");
        session.navigate(url, nav_timeout).await?;

        let landed = session.content().await?;
        if let Some(reason) = self.site.detect_block(&landed) {
            self.write_page(ctx, &landed).await;
            return Err(AdapterError::Blocked(reason));
        }

        let signal = self.site.ready_signal();
        let ready_timeout = settings
            .ready_timeout
            .unwrap_or_else(|| self.site.ready_timeout());
        debug!(signal = %signal, timeout = ?ready_timeout, "Waiting for results");
        if let Err(e) = session.wait_for(&signal, ready_timeout).await {
            if let Ok(content) = session.content().await {
                self.write_page(ctx, &content).await;
            }
            return Err(e.into());
        }

        let settle = settings
            .settle_delay
            .unwrap_or_else(|| self.site.settle_delay());
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        let content = session.content().await?;
        self.write_page(ctx, &content).await;

        let extractor = self.site.extractor();
        let cap = settings
            .max_candidates_for(source)
            .unwrap_or_else(|| extractor.max_candidates());
        let scraped_at = Utc::now();
        let records: Vec<FlightRecord> = extractor
            .extract_html_capped(&content, cap)
            .into_iter()
            .filter_map(|draft| draft.into_record(source, url.as_str(), scraped_at))
            .collect();

        if records.is_empty() {
            return Err(AdapterError::NoRecords);
        }

        self.write_records(ctx, query, url, &records).await;
        Ok(records)
    }

    async fn release(&self, session: &mut dyn RenderSession, ctx: &FetchContext) {
        let timeout = ctx.settings.release_timeout;
        match tokio::time::timeout(timeout, session.close()).await {
            Ok(Ok(())) => debug!("Session released"),
            Ok(Err(e)) => warn!(error = %e, "Failed to release session"),
            Err(_) => warn!(timeout = ?timeout, "Timed out releasing session"),
        }
    }

    async fn write_page(&self, ctx: &FetchContext, content: &str) {
        let Some(sink) = ctx.artifact_sink() else {
            return;
        };
        if let Err(e) = sink.write_page(self.site.source(), content).await {
            warn!(error = %e, "Failed to write page snapshot");
        }
    }

    async fn write_records(
        &self,
        ctx: &FetchContext,
        query: &FlightQuery,
        url: &Url,
        records: &[FlightRecord],
    ) {
        let Some(sink) = ctx.artifact_sink() else {
            return;
        };
        let source = self.site.source();
        let dump = RecordDump {
            platform: source.display_name().to_string(),
            search_query: query.describe(),
            url: url.to_string(),
            timestamp: Utc::now(),
            flights: records.to_vec(),
        };
        if let Err(e) = sink.write_records(source, &dump).await {
            warn!(error = %e, "Failed to write record dump");
        }
    }
}

#[async_trait]
impl<S: SourceSite> SourceAdapter for SiteAdapter<S> {
    fn source(&self) -> SourceId {
        self.site.source()
    }

    #[instrument(skip(self, query, ctx), fields(source = %self.site.source()))]
    async fn fetch(&self, query: &FlightQuery, ctx: &FetchContext) -> SourceOutcome {
        let source = self.site.source();

        let url = match self.site.request_url(query, &ctx.airports) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Could not build search URL");
                return SourceOutcome::failure(source, e.kind(), e.to_string());
            }
        };

        let mut session = match ctx.renderer.open(&self.site.render_options()).await {
            Ok(session) => session,
            Err(e) => {
                let e = AdapterError::from(e);
                warn!(error = %e, "Could not open render session");
                return SourceOutcome::failure(source, e.kind(), e.to_string());
            }
        };

        let driven = AssertUnwindSafe(self.drive(session.as_mut(), &url, query, ctx))
            .catch_unwind()
            .await;
        self.release(session.as_mut(), ctx).await;

        match driven {
            Ok(Ok(records)) => {
                info!(count = records.len(), "Flights extracted");
                SourceOutcome::success(source, records)
            }
            Ok(Err(e)) => {
                warn!(error = %e, kind = %e.kind(), "Source failed");
                SourceOutcome::failure(source, e.kind(), e.to_string())
            }
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
