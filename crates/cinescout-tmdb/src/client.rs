//! HTTP client for the TMDB v3 REST API.
//!
//! Wraps `reqwest` with bearer-token auth, transient-error retry, and lenient
//! decoding of the paginated movie list envelope.

use std::time::Duration;

use cinescout_core::{AppConfig, MovieRecord};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Url};

use crate::error::FetchError;
use crate::retry::retry_with_backoff;
use crate::types::MovieListResponse;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DISCOVER_PATH: &str = "discover/movie";
const SEARCH_PATH: &str = "search/movie";

/// Client for the TMDB movie endpoints.
///
/// Use [`TmdbClient::new`] for production or [`TmdbClient::with_base_url`] to
/// point at a mock server in tests. Retries are off until
/// [`TmdbClient::with_retry_policy`] turns them on.
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl TmdbClient {
    /// Creates a new client pointed at the production TMDB API.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`FetchError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cinescout/0.1 (movie-discovery)")
            .build()?;

        // Exactly one trailing slash, so `join` appends below the version
        // segment (`/3/discover/movie`) instead of replacing it.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| FetchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(FetchError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Builds a client from the loaded application config, retry policy included.
    ///
    /// # Errors
    ///
    /// See [`TmdbClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        Ok(Self::with_base_url(
            &config.tmdb_api_key,
            config.tmdb_request_timeout_secs,
            &config.tmdb_api_base_url,
        )?
        .with_retry_policy(config.tmdb_max_retries, config.tmdb_retry_backoff_base_ms))
    }

    /// Sets how many extra attempts a transient failure gets, and the base
    /// back-off delay between them.
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetches movies for `query`.
    ///
    /// An empty query lists movies by popularity (descending); anything else,
    /// whitespace included, searches by title exactly as given. A `results: []` payload is a successful, empty
    /// answer.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] on network failure after retries.
    /// - [`FetchError::Http`] on a non-2xx status after retries.
    /// - [`FetchError::NoResults`] if the body is not JSON or has no
    ///   `results` array.
    pub async fn fetch_movies(&self, query: &str) -> Result<Vec<MovieRecord>, FetchError> {
        let url = self.movies_url(query)?;
        tracing::debug!(path = url.path(), browse = query.is_empty(), "fetching movies");

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_body(&url)
        })
        .await?;

        Self::parse_movies(&body)
    }

    /// Builds the discover or search URL for `query`.
    ///
    /// The search term is percent-encoded by hand so that spaces become `%20`
    /// rather than the `+` that form encoding would produce.
    fn movies_url(&self, query: &str) -> Result<Url, FetchError> {
        let path = if query.is_empty() {
            DISCOVER_PATH
        } else {
            SEARCH_PATH
        };
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        if query.is_empty() {
            url.set_query(Some("sort_by=popularity.desc"));
        } else {
            let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC);
            url.set_query(Some(&format!("query={encoded}")));
        }
        Ok(url)
    }

    /// Sends an authenticated GET and returns the body of a 2xx response.
    async fn request_body(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Decodes the envelope and its movies, skipping entries that do not
    /// decode.
    fn parse_movies(body: &str) -> Result<Vec<MovieRecord>, FetchError> {
        let envelope: MovieListResponse = match serde_json::from_str(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "TMDB body is not a movie list");
                return Err(FetchError::NoResults);
            }
        };
        let Some(items) = envelope.results else {
            return Err(FetchError::NoResults);
        };

        let movies = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                serde_json::from_value::<MovieRecord>(value)
                    .map_err(|e| {
                        tracing::warn!(index, error = %e, "skipping malformed movie entry");
                    })
                    .ok()
            })
            .collect();
        Ok(movies)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
