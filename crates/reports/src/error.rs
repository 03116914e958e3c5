use thiserror::Error;

use clients::FetchError;

/// Report-level error taxonomy, mapped to HTTP by the server crate.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Bad query parameter; surfaced as 422 with the message as-is.
    #[error("{0}")]
    Validation(String),
    /// Upstream unreachable or timed out; surfaced as 503.
    #[error("{0}")]
    Unavailable(String),
    /// Upstream answered with a non-2xx; its status and body are surfaced.
    #[error("{body}")]
    Upstream { status: u16, body: String },
    /// Anything unexpected during orchestration.
    #[error("internal error generating report: {0}")]
    Internal(String),
}

impl From<FetchError> for ReportError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Unavailable { .. } => ReportError::Unavailable(err.to_string()),
            FetchError::Upstream { status, .. } => {
                ReportError::Upstream { status, body: err.to_string() }
            }
            // Callers degrade Malformed before converting; reaching here
            // means a path that chose not to, so keep the diagnostics.
            FetchError::Malformed { .. } => ReportError::Internal(err.to_string()),
        }
    }
}
