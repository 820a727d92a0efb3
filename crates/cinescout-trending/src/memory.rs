//! In-process [`TrendingStore`].
//!
//! Behaves like the hosted store where it matters to the aggregator: lookups
//! and writes are separate calls, nothing stops a second document for the same
//! movie, and listing orders by count with insertion order on ties. An
//! optional per-call latency makes lookup/write interleavings reproducible,
//! and a failing switch exercises error paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use cinescout_core::TrendingEntry;

use crate::error::StoreError;
use crate::store::{EntryUpdate, StoredEntry, TrendingStore};

#[derive(Debug, Default)]
struct Documents {
    rows: Vec<StoredEntry>,
    next_id: u64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<Documents>,
    latency: Option<Duration>,
    failing: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `latency` at the start of every store call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// While set, every call fails with HTTP 503.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of all documents in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<StoredEntry> {
        self.lock().rows.clone()
    }

    /// Number of documents held for `movie_id`.
    #[must_use]
    pub fn count_for_movie(&self, movie_id: i64) -> usize {
        self.lock()
            .rows
            .iter()
            .filter(|row| row.entry.movie_id == movie_id)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Documents> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn enter(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: 503,
                message: "memory store is set to fail".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TrendingStore for MemoryStore {
    async fn find_by_movie_id(&self, movie_id: i64) -> Result<StoredEntry, StoreError> {
        self.enter().await?;
        self.lock()
            .rows
            .iter()
            .find(|row| row.entry.movie_id == movie_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_entry(&self, entry: &TrendingEntry) -> Result<StoredEntry, StoreError> {
        self.enter().await?;
        let mut documents = self.lock();
        documents.next_id += 1;
        let stored = StoredEntry {
            document_id: format!("mem-{}", documents.next_id),
            entry: entry.clone(),
        };
        documents.rows.push(stored.clone());
        Ok(stored)
    }

    async fn update_entry(
        &self,
        document_id: &str,
        update: &EntryUpdate,
    ) -> Result<StoredEntry, StoreError> {
        self.enter().await?;
        let mut documents = self.lock();
        let row = documents
            .rows
            .iter_mut()
            .find(|row| row.document_id == document_id)
            .ok_or_else(|| StoreError::Status {
                status: 404,
                message: format!("document {document_id} not found"),
            })?;
        row.entry.search_term.clone_from(&update.search_term);
        row.entry.search_count = update.search_count;
        row.entry.last_searched_at = update.last_searched_at;
        Ok(row.clone())
    }

    async fn list_by_search_count(&self, limit: usize) -> Result<Vec<StoredEntry>, StoreError> {
        self.enter().await?;
        let mut rows = self.lock().rows.clone();
        // Stable sort: ties keep insertion order.
        rows.sort_by(|a, b| b.entry.search_count.cmp(&a.entry.search_count));
        rows.truncate(limit);
        Ok(rows)
    }
}
