//! The state a front-end renders from.

use cinescout_core::{MovieRecord, TrendingEntry};
use cinescout_tmdb::FetchError;

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch movies, try again later.";
pub const BROWSE_EMPTY_MESSAGE: &str = "No movies available right now.";

/// Which of the two fetch triggers a settled query represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    /// Empty query: popular movies.
    Browse,
    /// Nonempty query: title search for the trimmed term.
    Search(String),
}

impl SearchMode {
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let term = query.trim();
        if term.is_empty() {
            SearchMode::Browse
        } else {
            SearchMode::Search(term.to_string())
        }
    }

    /// The message shown in place of results when a fetch fails.
    #[must_use]
    pub fn error_message(&self, err: &FetchError) -> String {
        match (err, self) {
            (FetchError::NoResults, SearchMode::Search(term)) => {
                format!("No movies found for \"{term}\".")
            }
            (FetchError::NoResults, SearchMode::Browse) => BROWSE_EMPTY_MESSAGE.to_string(),
            _ => FETCH_FAILED_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Exactly what the user has typed so far.
    pub raw_input: String,
    /// The query most recently sent to the catalog, if any.
    pub settled_query: Option<String>,
    pub movies: Vec<MovieRecord>,
    pub error_message: Option<String>,
    pub loading: bool,
    pub trending: Vec<TrendingEntry>,
    /// Generation of the fetch whose answer `movies` holds; 0 before the
    /// first answer.
    pub generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_is_browse() {
        assert_eq!(SearchMode::from_query(""), SearchMode::Browse);
        assert_eq!(SearchMode::from_query("  \t"), SearchMode::Browse);
    }

    #[test]
    fn query_is_trimmed_for_search() {
        assert_eq!(
            SearchMode::from_query("  batman "),
            SearchMode::Search("batman".to_string())
        );
    }

    #[test]
    fn no_results_message_depends_on_mode() {
        let search = SearchMode::Search("batman".to_string());
        assert_eq!(
            search.error_message(&FetchError::NoResults),
            "No movies found for \"batman\"."
        );
        assert_eq!(
            SearchMode::Browse.error_message(&FetchError::NoResults),
            BROWSE_EMPTY_MESSAGE
        );
    }

    #[test]
    fn http_failure_shows_retry_later_in_both_modes() {
        assert_eq!(
            SearchMode::Browse.error_message(&FetchError::Http(500)),
            FETCH_FAILED_MESSAGE
        );
        assert_eq!(
            SearchMode::Search("x".to_string()).error_message(&FetchError::Http(503)),
            FETCH_FAILED_MESSAGE
        );
    }
}
