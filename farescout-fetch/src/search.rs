//! End-to-end search: interpret, orchestrate, aggregate.

use tracing::{info, instrument, warn};

use farescout_core::{ComparisonReport, FlightQuery, QueryInterpreter};

use crate::aggregate::{aggregate, interpreter_failure_report};
use crate::context::FetchContext;
use crate::pipeline::Orchestrator;

/// A query interpreter plus the sources to ask.
#[derive(Debug)]
pub struct FlightSearch<I> {
    interpreter: I,
    orchestrator: Orchestrator,
}

impl<I: QueryInterpreter> FlightSearch<I> {
    /// Creates a search.
    pub fn new(interpreter: I, orchestrator: Orchestrator) -> Self {
        Self {
            interpreter,
            orchestrator,
        }
    }

    /// The interpreter in use.
    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    /// The orchestrator in use.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Answers free text.
    ///
    /// If the interpreter rejects the text, no source is asked and the report
    /// carries the interpreter error alone.
    #[instrument(skip(self, ctx), fields(interpreter = self.interpreter.name()))]
    pub async fn run(&self, raw_query: &str, ctx: &FetchContext) -> ComparisonReport {
        match self.interpreter.interpret(raw_query).await {
            Ok(query) => self.run_query(&query, ctx).await,
            Err(e) => {
                warn!(error = %e, "Could not interpret query");
                interpreter_failure_report(raw_query, &e)
            }
        }
    }

    /// Searches an already structured query.
    pub async fn run_query(&self, query: &FlightQuery, ctx: &FetchContext) -> ComparisonReport {
        info!(route = %query.describe(), "Searching flights");
        let run = self.orchestrator.run(query, ctx).await;
        aggregate(query, &run)
    }
}
