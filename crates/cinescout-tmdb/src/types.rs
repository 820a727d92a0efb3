//! TMDB response envelope.
//!
//! Both `/discover/movie` and `/search/movie` return a paginated object whose
//! `results` array holds the movies. Items are kept as raw JSON here so the
//! client can skip a single malformed entry instead of failing the page.

use serde::Deserialize;

/// Top-level response from the discover and search endpoints.
#[derive(Debug, Deserialize)]
pub struct MovieListResponse {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub results: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u64>,
}
