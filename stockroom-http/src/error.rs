use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("remote unreachable: {0}")]
    Unreachable(reqwest::Error),

    #[error("remote returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(reqwest::Error),
}

impl HttpError {
    /// True for transport failures (connection refused, timeout, DNS).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, HttpError::Unreachable(_))
    }
}
