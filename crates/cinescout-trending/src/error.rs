use thiserror::Error;

/// Errors returned by trending stores and the aggregator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required store identifier was blank at construction time.
    #[error("document store is not configured: {0} is empty")]
    NotConfigured(&'static str),

    #[error("invalid store endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// No document matched a lookup. The aggregator turns this into a create.
    #[error("no trending entry found")]
    NotFound,

    #[error("document store returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
