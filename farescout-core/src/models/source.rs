//! Source-related types.
//!
//! - [`SourceId`] - Enum of supported booking sites
//! - [`FailureKind`] - Why a source produced nothing
//! - [`SourceOutcome`] - Result of asking one source

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::flight::FlightRecord;
use crate::error::CoreError;

// ============================================================================
// Source Id
// ============================================================================

/// Supported flight booking sites, in orchestration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// makemytrip.com
    MakeMyTrip,
    /// cleartrip.com
    Cleartrip,
    /// easemytrip.com
    EaseMyTrip,
}

impl SourceId {
    /// Returns the display name for this source.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MakeMyTrip => "MakeMyTrip",
            Self::Cleartrip => "Cleartrip",
            Self::EaseMyTrip => "EaseMyTrip",
        }
    }

    /// Returns the short label used in error log entries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MakeMyTrip => "MMT",
            Self::Cleartrip => "Cleartrip",
            Self::EaseMyTrip => "EMT",
        }
    }

    /// Returns the CLI name (lowercase, no spaces).
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::MakeMyTrip => "makemytrip",
            Self::Cleartrip => "cleartrip",
            Self::EaseMyTrip => "easemytrip",
        }
    }

    /// Returns the file-name prefix for debug artifacts.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::MakeMyTrip => "mmt",
            Self::Cleartrip => "cleartrip",
            Self::EaseMyTrip => "emt",
        }
    }

    /// Returns all sources in their fixed orchestration order.
    pub fn all() -> &'static [SourceId] {
        &[Self::MakeMyTrip, Self::Cleartrip, Self::EaseMyTrip]
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SourceId {
    type Err = CoreError;

    /// Accepts the CLI name, the artifact prefix or the short label,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|id| {
                id.cli_name() == needle
                    || id.prefix() == needle
                    || id.label().eq_ignore_ascii_case(&needle)
            })
            .ok_or_else(|| CoreError::Other(format!("Unknown source: {s}")))
    }
}

// ============================================================================
// Failure Kind
// ============================================================================

/// Classification of a source (or interpreter) failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The free-text query could not be interpreted.
    InterpreterFailure,
    /// The page did not load within the navigation timeout.
    NavigationTimeout,
    /// The page could not be loaded for a reason other than a timeout.
    NavigationFailed,
    /// The page loaded but the results never appeared.
    ResultsWaitTimeout,
    /// The site served an anti-bot placeholder instead of results.
    Blocked,
    /// The results appeared but nothing usable could be extracted.
    NoRecordsExtracted,
    /// Anything else, including panics inside an adapter.
    UnexpectedAdapterFailure,
}

impl FailureKind {
    /// Returns a short human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InterpreterFailure => "could not understand the query",
            Self::NavigationTimeout => "page load timed out",
            Self::NavigationFailed => "page load failed",
            Self::ResultsWaitTimeout => "results did not appear",
            Self::Blocked => "blocked by the site",
            Self::NoRecordsExtracted => "no flights extracted",
            Self::UnexpectedAdapterFailure => "unexpected failure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

// ============================================================================
// Source Outcome
// ============================================================================

/// The result of asking one source for flights.
///
/// Either `succeeded` with at least one record, or failed with a kind and a
/// detail message. Build through [`SourceOutcome::success`] and
/// [`SourceOutcome::failure`] so the two shapes never mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutcome {
    /// Which source this is.
    pub source: SourceId,
    /// Whether the source produced records.
    pub succeeded: bool,
    /// Extracted records, empty on failure.
    pub records: Vec<FlightRecord>,
    /// Failure classification, absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    /// Failure detail, absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl SourceOutcome {
    /// Creates a successful outcome.
    ///
    /// An empty record list is not a success: it becomes a
    /// `NoRecordsExtracted` failure.
    pub fn success(source: SourceId, records: Vec<FlightRecord>) -> Self {
        if records.is_empty() {
            return Self::failure(
                source,
                FailureKind::NoRecordsExtracted,
                "No flights extracted",
            );
        }
        Self {
            source,
            succeeded: true,
            records,
            failure_kind: None,
            error_detail: None,
        }
    }

    /// Creates a failed outcome.
    pub fn failure(source: SourceId, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            source,
            succeeded: false,
            records: Vec::new(),
            failure_kind: Some(kind),
            error_detail: Some(detail.into()),
        }
    }

    /// Returns the `"{label}: {detail}"` line for the shared error log,
    /// or `None` on success.
    pub fn error_entry(&self) -> Option<String> {
        if self.succeeded {
            return None;
        }
        let detail = self
            .error_detail
            .as_deref()
            .or_else(|| self.failure_kind.map(|k| k.description()))
            .unwrap_or("unknown error");
        Some(format!("{}: {}", self.source.label(), detail))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_order_is_fixed() {
        assert_eq!(
            SourceId::all(),
            &[SourceId::MakeMyTrip, SourceId::Cleartrip, SourceId::EaseMyTrip]
        );
    }

    #[test]
    fn test_source_from_str_aliases() {
        assert_eq!("mmt".parse::<SourceId>().unwrap(), SourceId::MakeMyTrip);
        assert_eq!("MakeMyTrip".parse::<SourceId>().unwrap(), SourceId::MakeMyTrip);
        assert_eq!("EMT".parse::<SourceId>().unwrap(), SourceId::EaseMyTrip);
        assert_eq!("cleartrip".parse::<SourceId>().unwrap(), SourceId::Cleartrip);
        assert!("skyscanner".parse::<SourceId>().is_err());
    }

    #[test]
    fn test_empty_success_becomes_failure() {
        let outcome = SourceOutcome::success(SourceId::Cleartrip, Vec::new());
        assert!(!outcome.succeeded);
        assert_eq!(outcome.failure_kind, Some(FailureKind::NoRecordsExtracted));
    }

    #[test]
    fn test_error_entry_format() {
        let outcome = SourceOutcome::failure(
            SourceId::MakeMyTrip,
            FailureKind::NavigationTimeout,
            "Timeout 100000ms exceeded",
        );
        assert_eq!(
            outcome.error_entry().as_deref(),
            Some("MMT: Timeout 100000ms exceeded")
        );
    }
}
