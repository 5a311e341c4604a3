pub mod memory;
pub mod postgres;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::{cache::CacheRecord, news::NewsEntry, query::QueryDescriptor};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupted cache record for {key}: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Persistence for cached result sets and the archive of every entry seen.
///
/// Implementations must never return a record whose age has reached the
/// store's TTL, whether or not it has been physically removed yet.
#[async_trait]
pub trait Store: Send + Sync {
    async fn lookup(&self, key: &QueryDescriptor) -> Result<Option<CacheRecord>, StoreError>;

    /// Replaces the record for `key`. A write older than the stored
    /// `fetched_at` is dropped so timestamps never move backwards.
    async fn put(
        &self,
        key: &QueryDescriptor,
        entries: Vec<NewsEntry>,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Archives entries whose url has not been seen before. Returns how many were new.
    async fn index_entries(&self, entries: &[NewsEntry]) -> Result<usize, StoreError>;

    /// Removes expired cache records. Returns how many were removed.
    async fn purge_expired(&self) -> Result<usize, StoreError>;

    async fn close(&self) {}
}

pub fn spawn_expiry_sweeper(store: Arc<dyn Store>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!("Purged {} expired cache records", removed),
                Err(e) => warn!("Failed to purge expired cache records: {:?}", e),
            }
        }
    })
}
