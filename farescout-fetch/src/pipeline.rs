//! Orchestrator for running source adapters in order.
//!
//! The orchestrator invokes every registered adapter one after another,
//! isolates their failures (panics included), and keeps an ordered error log.
//! It never fails.

use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tracing::{debug, error, info, instrument, warn};

use farescout_core::{FailureKind, FlightQuery, SourceId, SourceOutcome};

use crate::adapter::SourceAdapter;
use crate::context::FetchContext;

// ============================================================================
// Source Attempt
// ============================================================================

/// Timing record of one adapter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAttempt {
    /// The source that was queried.
    pub source: SourceId,
    /// When the adapter was invoked.
    pub started_at: DateTime<Utc>,
    /// When the adapter returned.
    pub finished_at: DateTime<Utc>,
    /// Whether the attempt succeeded.
    pub succeeded: bool,
    /// Number of records returned.
    pub record_count: usize,
}

// ============================================================================
// Orchestrator Run
// ============================================================================

/// Everything one orchestrator run produced.
#[derive(Debug, Clone)]
pub struct OrchestratorRun {
    /// One outcome per adapter, in registration order.
    pub outcomes: Vec<SourceOutcome>,
    /// One attempt per adapter, in registration order.
    pub attempts: Vec<SourceAttempt>,
    /// `"{label}: {detail}"` per failed source, in invocation order.
    pub errors: Vec<String>,
    /// Total wall time.
    pub duration: Duration,
}

impl OrchestratorRun {
    /// Returns true if any source succeeded.
    pub fn any_succeeded(&self) -> bool {
        self.outcomes.iter().any(|o| o.succeeded)
    }

    /// Returns true if at least one source ran and every one failed.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| !o.succeeded)
    }

    /// Sources that succeeded, in order.
    pub fn succeeded_sources(&self) -> Vec<SourceId> {
        self.outcomes
            .iter()
            .filter(|o| o.succeeded)
            .map(|o| o.source)
            .collect()
    }

    /// Returns the outcome for `source`, if it ran.
    pub fn outcome(&self, source: SourceId) -> Option<&SourceOutcome> {
        self.outcomes.iter().find(|o| o.source == source)
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Runs adapters sequentially in registration order.
///
/// Adapters never run concurrently: each one is awaited to completion,
/// session release included, before the next starts.
#[derive(Default)]
pub struct Orchestrator {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl Orchestrator {
    /// Creates an orchestrator with no adapters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an orchestrator with the given adapters, in order.
    pub fn with_adapters(adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Appends an adapter.
    pub fn add_adapter(&mut self, adapter: Box<dyn SourceAdapter>) {
        self.adapters.push(adapter);
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if no adapter is registered.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Registered sources, in order.
    pub fn sources(&self) -> Vec<SourceId> {
        self.adapters.iter().map(|a| a.source()).collect()
    }

    /// Runs every adapter against `query`.
    #[instrument(skip(self, query, ctx), fields(adapters = self.adapters.len(), route = %query.describe()))]
    pub async fn run(&self, query: &FlightQuery, ctx: &FetchContext) -> OrchestratorRun {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(self.adapters.len());
        let mut attempts = Vec::with_capacity(self.adapters.len());
        let mut errors = Vec::new();

        if self.adapters.is_empty() {
            warn!("No source adapters configured");
        }

        for adapter in &self.adapters {
            let source = adapter.source();
            debug!(source = %source, "Running adapter");
            let started_at = Utc::now();

            let outcome = match AssertUnwindSafe(adapter.fetch(query, ctx))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let detail = panic_message(panic.as_ref());
                    error!(source = %source, detail = %detail, "Adapter panicked");
                    SourceOutcome::failure(source, FailureKind::UnexpectedAdapterFailure, detail)
                }
            };

            let finished_at = Utc::now();
            if let Some(entry) = outcome.error_entry() {
                errors.push(entry);
            }
            attempts.push(SourceAttempt {
                source,
                started_at,
                finished_at,
                succeeded: outcome.succeeded,
                record_count: outcome.records.len(),
            });
            outcomes.push(outcome);
        }

        let duration = start.elapsed();
        info!(
            succeeded = outcomes.iter().filter(|o| o.succeeded).count(),
            failed = errors.len(),
            duration = ?duration,
            "Orchestration finished"
        );

        OrchestratorRun {
            outcomes,
            attempts,
            errors,
            duration,
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("sources", &self.sources())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Adapter panicked".to_string()
    }
}
