//! The query controller: input state, settled-query fetches, and the
//! trending side effect.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use cinescout_core::{AppConfig, MovieRecord};
use cinescout_tmdb::MovieCatalog;
use cinescout_trending::TrendingAggregator;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::debounce::spawn_debouncer;
use crate::state::{SearchMode, SearchState};

/// Timing and sizing knobs for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub trending_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            trending_limit: 5,
        }
    }
}

impl SearchSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.search_debounce_ms),
            trending_limit: config.trending_limit,
        }
    }
}

/// Owns the search input and drives fetches from it.
///
/// Every fetch is tagged with a generation number. Starting a new fetch
/// aborts the previous one, and an answer is applied only while its
/// generation is still the newest, so a slow response can never overwrite a
/// fresher one.
///
/// All methods that start work spawn tokio tasks and must be called from
/// inside a runtime.
pub struct QueryController {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: Arc<dyn MovieCatalog>,
    trending: Arc<TrendingAggregator>,
    settings: SearchSettings,
    state: watch::Sender<SearchState>,
    input: watch::Sender<String>,
    generation: AtomicU64,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    mounted: AtomicBool,
}

impl QueryController {
    pub fn new(
        catalog: Arc<dyn MovieCatalog>,
        trending: Arc<TrendingAggregator>,
        settings: SearchSettings,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        let (input, _) = watch::channel(String::new());
        Self {
            inner: Arc::new(Inner {
                catalog,
                trending,
                settings,
                state,
                input,
                generation: AtomicU64::new(0),
                in_flight: Mutex::new(None),
                mounted: AtomicBool::new(false),
            }),
        }
    }

    /// A receiver that observes every published [`SearchState`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Replaces the raw input. Takes effect immediately in the published
    /// state; a fetch follows once the input settles.
    pub fn set_input(&self, raw: impl Into<String>) {
        let raw = raw.into();
        self.inner.state.send_modify(|s| s.raw_input.clone_from(&raw));
        self.inner.input.send_replace(raw);
    }

    /// Loads popular movies and the trending rail, then starts following the
    /// input.
    ///
    /// The initial browse fetch is issued directly rather than through the
    /// debouncer; the debouncer only reacts to input changes made after this
    /// call. The returned task ends when the controller is dropped.
    ///
    /// Only the first call mounts; later calls return `None` and start
    /// nothing.
    pub fn mount(&self) -> Option<JoinHandle<()>> {
        if self.inner.mounted.swap(true, Ordering::SeqCst) {
            tracing::debug!("query controller already mounted");
            return None;
        }
        self.submit(String::new());
        tokio::spawn(Arc::clone(&self.inner).refresh_trending());

        let (mut settled, _debouncer) =
            spawn_debouncer(self.inner.input.subscribe(), self.inner.settings.debounce);
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);

        Some(tokio::spawn(async move {
            while let Some(query) = settled.recv().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                Inner::submit(&inner, query);
            }
        }))
    }

    /// Fetches `query` now, bypassing the debounce. Returns the generation
    /// assigned to this fetch.
    pub fn submit(&self, query: impl Into<String>) -> u64 {
        Inner::submit(&self.inner, query.into())
    }
}

impl Inner {
    fn submit(this: &Arc<Self>, query: String) -> u64 {
        let mode = SearchMode::from_query(&query);
        let mut in_flight = this.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        let generation = this.generation.fetch_add(1, Ordering::SeqCst) + 1;
        this.state.send_modify(|s| {
            s.settled_query = Some(query.clone());
            s.loading = true;
            s.error_message = None;
        });

        let task = tokio::spawn(Arc::clone(this).run_fetch(generation, mode));
        if let Some(previous) = in_flight.replace(task) {
            previous.abort();
        }
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn run_fetch(self: Arc<Self>, generation: u64, mode: SearchMode) {
        let query = match &mode {
            SearchMode::Browse => "",
            SearchMode::Search(term) => term.as_str(),
        };
        let result = self.catalog.fetch_movies(query).await;

        if let Err(e) = &result {
            tracing::warn!(query, error = %e, "movie fetch failed");
        }

        let mut top_hit: Option<MovieRecord> = None;
        let applied = self.state.send_if_modified(|s| {
            // Checked under the state lock so a newer submit cannot slip in
            // between the check and the write.
            if !self.is_current(generation) {
                return false;
            }
            match result {
                Ok(movies) => {
                    top_hit = movies.first().cloned();
                    s.movies = movies;
                    s.error_message = None;
                }
                Err(e) => {
                    s.movies.clear();
                    s.error_message = Some(mode.error_message(&e));
                }
            }
            s.loading = false;
            s.generation = generation;
            true
        });

        if !applied {
            tracing::debug!(generation, query, "discarding stale movie response");
            return;
        }

        // Only a keyword search that surfaced something counts as a hit.
        if let (SearchMode::Search(term), Some(movie)) = (mode, top_hit) {
            // Detached so that aborting a superseded fetch never cuts a
            // store write short.
            tokio::spawn(Arc::clone(&self).record_hit(term, movie));
        }
    }

    async fn record_hit(self: Arc<Self>, term: String, movie: MovieRecord) {
        if let Err(e) = self.trending.record_search_hit(&term, &movie).await {
            tracing::warn!(
                term = %term,
                movie_id = movie.id,
                error = %e,
                "failed to record trending search hit"
            );
        }
        self.refresh_trending().await;
    }

    async fn refresh_trending(self: Arc<Self>) {
        match self
            .trending
            .list_top_trending(self.settings.trending_limit)
            .await
        {
            Ok(entries) => self.state.send_modify(|s| s.trending = entries),
            Err(e) => tracing::warn!(error = %e, "failed to load trending movies"),
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
