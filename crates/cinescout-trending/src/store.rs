//! The persistence seam behind the aggregator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinescout_core::TrendingEntry;

use crate::error::StoreError;

/// A trending entry together with the store's own document id.
///
/// The document id is opaque and distinct from `entry.movie_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub document_id: String,
    pub entry: TrendingEntry,
}

/// The fields a repeat hit rewrites. Movie id, title and poster stay as they
/// were when the entry was created.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryUpdate {
    pub search_term: String,
    pub search_count: u64,
    pub last_searched_at: DateTime<Utc>,
}

/// Document operations the aggregator needs.
///
/// Implementations are not expected to be atomic across calls: a lookup
/// followed by a write can race with another writer.
#[async_trait]
pub trait TrendingStore: Send + Sync {
    /// Looks up the entry for `movie_id`.
    ///
    /// Returns [`StoreError::NotFound`] when no document matches.
    async fn find_by_movie_id(&self, movie_id: i64) -> Result<StoredEntry, StoreError>;

    /// Inserts a new document for `entry`.
    async fn create_entry(&self, entry: &TrendingEntry) -> Result<StoredEntry, StoreError>;

    /// Overwrites the counter fields of an existing document.
    async fn update_entry(
        &self,
        document_id: &str,
        update: &EntryUpdate,
    ) -> Result<StoredEntry, StoreError>;

    /// Lists up to `limit` entries ordered by `search_count`, highest first.
    async fn list_by_search_count(&self, limit: usize) -> Result<Vec<StoredEntry>, StoreError>;
}
