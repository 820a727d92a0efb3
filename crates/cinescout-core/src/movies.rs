//! Domain types shared by the catalog client, the trending aggregator, and
//! the query controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A movie as returned by the metadata API.
///
/// Only `id` is required on the wire; the rest default so that a sparse entry
/// (no poster, no popularity score) still decodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
}

impl MovieRecord {
    /// The title to show and persist: `title`, or `original_title` when the
    /// localized title is blank.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            self.original_title.as_deref().unwrap_or_default()
        } else {
            &self.title
        }
    }
}

/// Persistent search counter for one movie.
///
/// At most one entry exists per `movie_id`. `search_count` only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub movie_id: i64,
    /// The most recent search term that surfaced this movie.
    pub search_term: String,
    pub movie_title: String,
    pub poster_path: Option<String>,
    pub poster_url: Option<String>,
    pub search_count: u64,
    pub last_searched_at: DateTime<Utc>,
}

/// Joins the image CDN base URL and a poster path.
///
/// Returns `None` when there is no path (or it is blank), so callers can
/// persist an explicit null rather than a dangling base URL.
#[must_use]
pub fn poster_url(image_base_url: &str, poster_path: Option<&str>) -> Option<String> {
    let path = poster_path.map(str::trim).filter(|p| !p.is_empty())?;
    let base = image_base_url.trim_end_matches('/');
    if path.starts_with('/') {
        Some(format!("{base}{path}"))
    } else {
        Some(format!("{base}/{path}"))
    }
}
