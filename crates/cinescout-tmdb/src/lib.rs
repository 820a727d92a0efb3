//! Client for the TMDB movie metadata API.
//!
//! [`TmdbClient::fetch_movies`] is the single entry point: an empty query
//! lists popular movies, anything else searches by title.

pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod types;

use async_trait::async_trait;
use cinescout_core::MovieRecord;

pub use client::TmdbClient;
pub use error::FetchError;

/// Source of movie listings, as seen by the query controller.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Lists popular movies when `query` is empty, otherwise searches by title.
    async fn fetch_movies(&self, query: &str) -> Result<Vec<MovieRecord>, FetchError>;
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn fetch_movies(&self, query: &str) -> Result<Vec<MovieRecord>, FetchError> {
        TmdbClient::fetch_movies(self, query).await
    }
}
