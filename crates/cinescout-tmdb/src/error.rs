use thiserror::Error;

/// Errors returned by the TMDB client.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("unexpected HTTP status {0}")]
    Http(u16),

    /// The body decoded, but carried no usable `results` list.
    #[error("response did not contain a results list")]
    NoResults,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl FetchError {
    /// The HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http(status) => Some(*status),
            FetchError::Transport(e) => e.status().map(|s| s.as_u16()),
            FetchError::NoResults | FetchError::InvalidBaseUrl { .. } => None,
        }
    }
}
