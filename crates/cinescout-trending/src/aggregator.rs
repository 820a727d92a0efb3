//! Upsert and ranking rules for trending search counters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use cinescout_core::{poster_url, MovieRecord, TrendingEntry};

use crate::error::StoreError;
use crate::store::{EntryUpdate, TrendingStore};

type WriterLock = Arc<tokio::sync::Mutex<()>>;

/// Records search hits and reads the top of the trending list.
///
/// Hits for the same movie go through a per-movie async lock, so two searches
/// racing in this process cannot both miss the lookup and insert twice. The
/// store itself gives no such guarantee: a second process writing to the same
/// collection can still create a duplicate.
pub struct TrendingAggregator {
    store: Arc<dyn TrendingStore>,
    image_base_url: String,
    writers: Mutex<HashMap<i64, WriterLock>>,
}

impl TrendingAggregator {
    /// Builds an aggregator over `store`. Poster URLs are `image_base_url`
    /// joined with the movie's poster path.
    pub fn new(store: Arc<dyn TrendingStore>, image_base_url: impl Into<String>) -> Self {
        Self {
            store,
            image_base_url: image_base_url.into(),
            writers: Mutex::new(HashMap::new()),
        }
    }

    /// Counts one search hit of `term` on `movie`.
    ///
    /// An existing entry gets `search_count + 1`, the new term, and a fresh
    /// timestamp; its movie id, title and poster are left as they are. A
    /// movie seen for the first time gets a new entry with a count of 1.
    ///
    /// # Errors
    ///
    /// Returns the store's error. A lookup that fails for any reason other
    /// than [`StoreError::NotFound`] aborts without writing.
    pub async fn record_search_hit(
        &self,
        term: &str,
        movie: &MovieRecord,
    ) -> Result<TrendingEntry, StoreError> {
        let writer = self.writer_for(movie.id);
        let _guard = writer.lock.lock().await;
        self.upsert(term, movie).await
    }

    /// Returns up to `limit` entries, highest `search_count` first.
    ///
    /// Order among equal counts is whatever the store returns and should not
    /// be relied on.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn list_top_trending(&self, limit: usize) -> Result<Vec<TrendingEntry>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut entries: Vec<TrendingEntry> = self
            .store
            .list_by_search_count(limit)
            .await?
            .into_iter()
            .map(|stored| stored.entry)
            .collect();
        entries.sort_by(|a, b| b.search_count.cmp(&a.search_count));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn upsert(&self, term: &str, movie: &MovieRecord) -> Result<TrendingEntry, StoreError> {
        match self.store.find_by_movie_id(movie.id).await {
            Ok(existing) => {
                let update = EntryUpdate {
                    search_term: term.to_string(),
                    search_count: existing.entry.search_count.saturating_add(1),
                    last_searched_at: Utc::now(),
                };
                let stored = self
                    .store
                    .update_entry(&existing.document_id, &update)
                    .await?;
                tracing::info!(
                    movie_id = movie.id,
                    search_count = stored.entry.search_count,
                    "trending entry updated"
                );
                Ok(stored.entry)
            }
            Err(StoreError::NotFound) => {
                let entry = TrendingEntry {
                    movie_id: movie.id,
                    search_term: term.to_string(),
                    movie_title: movie.display_title().to_string(),
                    poster_path: movie.poster_path.clone(),
                    poster_url: poster_url(&self.image_base_url, movie.poster_path.as_deref()),
                    search_count: 1,
                    last_searched_at: Utc::now(),
                };
                let stored = self.store.create_entry(&entry).await?;
                tracing::info!(
                    movie_id = movie.id,
                    document_id = %stored.document_id,
                    "trending entry created"
                );
                Ok(stored.entry)
            }
            Err(e) => Err(e),
        }
    }

    fn writer_for(&self, movie_id: i64) -> Writer<'_> {
        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        Writer {
            writers: &self.writers,
            movie_id,
            lock: Arc::clone(writers.entry(movie_id).or_default()),
        }
    }
}

/// A caller's claim on a movie's writer lock.
///
/// Dropping it, whether the hit finished or its future was dropped while
/// waiting, removes the map entry once no other caller holds a claim.
struct Writer<'a> {
    writers: &'a Mutex<HashMap<i64, WriterLock>>,
    movie_id: i64,
    lock: WriterLock,
}

impl Drop for Writer<'_> {
    fn drop(&mut self) {
        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one held here.
        if writers
            .get(&self.movie_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 2)
        {
            writers.remove(&self.movie_id);
        }
    }
}

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod tests;
