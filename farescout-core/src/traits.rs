//! Trait definitions for `FareScout`.

use crate::error::InterpretError;
use crate::models::FlightQuery;

/// Turns free text into a structured [`FlightQuery`].
///
/// Implementors may call out to anything (a pattern matcher, a language
/// model, a remote service). A failure here short-circuits the whole search:
/// no source is asked.
pub trait QueryInterpreter: Send + Sync {
    /// Returns a short name used in logs.
    fn name(&self) -> &str;

    /// Interprets `text` into a query.
    fn interpret(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<FlightQuery, InterpretError>> + Send;
}
