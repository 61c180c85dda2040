//! Fetch error types.

use std::time::Duration;
use thiserror::Error;

use farescout_core::FailureKind;

// ============================================================================
// Render Error
// ============================================================================

/// Error type for document renderer operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The page did not finish loading in time.
    #[error("Timeout {}ms exceeded navigating to {url}", .timeout.as_millis())]
    NavigationTimeout {
        /// Target URL.
        url: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// The page could not be loaded.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The ready signal never appeared.
    #[error("Timeout {}ms exceeded waiting for {signal}", .timeout.as_millis())]
    WaitTimeout {
        /// Description of the awaited signal.
        signal: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// No page has been loaded in this session yet.
    #[error("No page loaded")]
    NoPage,

    /// The session could not be opened or released.
    #[error("Session error: {0}")]
    Session(String),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

// ============================================================================
// Artifact Error
// ============================================================================

/// Error writing a debug artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record dump could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// Adapter Error
// ============================================================================

/// Error raised inside a source adapter.
///
/// Never escapes the adapter: it is folded into a failed
/// [`SourceOutcome`](farescout_core::SourceOutcome) via [`AdapterError::kind`].
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Navigation timed out.
    #[error("{0}")]
    NavigationTimeout(String),

    /// Navigation failed for another reason.
    #[error("{0}")]
    NavigationFailed(String),

    /// The results never appeared.
    #[error("{0}")]
    ResultsWaitTimeout(String),

    /// The site served an anti-bot page.
    #[error("{0}")]
    Blocked(String),

    /// Nothing usable was extracted.
    #[error("Could not extract flights")]
    NoRecords,

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Anything else.
    #[error("{0}")]
    Unexpected(String),
}

impl AdapterError {
    /// Maps this error onto the failure taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NavigationTimeout(_) => FailureKind::NavigationTimeout,
            Self::NavigationFailed(_) => FailureKind::NavigationFailed,
            Self::ResultsWaitTimeout(_) => FailureKind::ResultsWaitTimeout,
            Self::Blocked(_) => FailureKind::Blocked,
            Self::NoRecords => FailureKind::NoRecordsExtracted,
            Self::InvalidRequest(_) | Self::Unexpected(_) => FailureKind::UnexpectedAdapterFailure,
        }
    }
}

impl From<RenderError> for AdapterError {
    fn from(err: RenderError) -> Self {
        let detail = err.to_string();
        match err {
            RenderError::NavigationTimeout { .. } => Self::NavigationTimeout(detail),
            RenderError::WaitTimeout { .. } => Self::ResultsWaitTimeout(detail),
            RenderError::Navigation(_)
            | RenderError::DomainNotAllowed(_)
            | RenderError::InvalidUrl(_)
            | RenderError::Http(_) => Self::NavigationFailed(detail),
            RenderError::NoPage | RenderError::Session(_) => Self::Unexpected(detail),
        }
    }
}

impl From<farescout_core::CoreError> for AdapterError {
    fn from(err: farescout_core::CoreError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_classification() {
        let timeout = RenderError::NavigationTimeout {
            url: "https://example.com".to_string(),
            timeout: Duration::from_secs(100),
        };
        let err = AdapterError::from(timeout);
        assert_eq!(err.kind(), FailureKind::NavigationTimeout);
        assert_eq!(
            err.to_string(),
            "Timeout 100000ms exceeded navigating to https://example.com"
        );

        let wait = RenderError::WaitTimeout {
            signal: "selector .listingCard".to_string(),
            timeout: Duration::from_secs(45),
        };
        assert_eq!(
            AdapterError::from(wait).kind(),
            FailureKind::ResultsWaitTimeout
        );

        let nav = RenderError::Navigation("HTTP 403 Forbidden".to_string());
        assert_eq!(AdapterError::from(nav).kind(), FailureKind::NavigationFailed);

        assert_eq!(
            AdapterError::from(RenderError::NoPage).kind(),
            FailureKind::UnexpectedAdapterFailure
        );
    }

    #[test]
    fn test_no_records_kind() {
        assert_eq!(AdapterError::NoRecords.kind(), FailureKind::NoRecordsExtracted);
        assert_eq!(
            AdapterError::Blocked("Bot Trap 200-OK".to_string()).kind(),
            FailureKind::Blocked
        );
    }
}
