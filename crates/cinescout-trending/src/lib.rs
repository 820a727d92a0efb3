//! Search-hit counters for the trending rail.
//!
//! [`TrendingAggregator`] owns the upsert rules; the [`TrendingStore`] it is
//! built with owns persistence. [`AppwriteStore`] talks to the hosted
//! document database, [`MemoryStore`] keeps everything in process.

pub mod aggregator;
pub mod appwrite;
pub mod error;
pub mod memory;
pub mod store;

pub use aggregator::TrendingAggregator;
pub use appwrite::AppwriteStore;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{EntryUpdate, StoredEntry, TrendingStore};
