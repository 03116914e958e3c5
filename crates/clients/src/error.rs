use thiserror::Error;

/// Failure modes of an upstream call.
///
/// `Unavailable` and `Upstream` fail the enclosing report; `Malformed` is
/// degraded to an empty record list by the report layer, so aggregation over
/// a shape-shifted payload yields empty output instead of an error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("error communicating with {service}: {detail}")]
    Unavailable { service: &'static str, detail: String },
    #[error("{service} returned error: {body}")]
    Upstream { service: &'static str, status: u16, body: String },
    #[error("unexpected response from {service}: {detail}")]
    Malformed { service: &'static str, detail: String },
}

impl FetchError {
    pub(crate) fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        FetchError::Unavailable { service, detail: err.to_string() }
    }
}
