use thiserror::Error;

/// The two failure kinds every remote interaction can produce. Everything
/// network-shaped (DNS, timeout, non-2xx, backend-reported error) is
/// `Request`; a 2xx body that does not carry the fields we need is `Shape`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // Body decode problems are shape failures; everything else is transport.
        if err.is_decode() {
            FetchError::Shape(err.to_string())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

impl FetchError {
    /// Transport-level failures are worth a bounded retry; a malformed body
    /// will not improve on the second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Request(_))
    }
}
