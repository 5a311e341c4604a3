use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::{mapref::entry::Entry, DashMap};

use crate::models::{
    cache::{CacheRecord, CACHE_TTL},
    news::NewsEntry,
    query::QueryDescriptor,
};
use crate::store::{Store, StoreError};

/// Process-local store. Nothing survives a restart.
pub struct MemoryStore {
    records: DashMap<String, CacheRecord>,
    archive: DashMap<String, NewsEntry>,
    ttl: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: DashMap::new(),
            archive: DashMap::new(),
            ttl,
        }
    }
}

#[cfg(test)]
impl MemoryStore {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn archived_count(&self) -> usize {
        self.archive.len()
    }

    pub fn archived(&self, url: &str) -> Option<NewsEntry> {
        self.archive.get(url).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn lookup(&self, key: &QueryDescriptor) -> Result<Option<CacheRecord>, StoreError> {
        let key = key.cache_key();
        let now = Utc::now();
        let ttl = self.ttl;

        if let Some(record) = self.records.get(&key) {
            if record.is_fresh(now, ttl) {
                return Ok(Some(record.clone()));
            }
        }
        self.records.remove_if(&key, |_, record| !record.is_fresh(now, ttl));
        Ok(None)
    }

    async fn put(
        &self,
        key: &QueryDescriptor,
        entries: Vec<NewsEntry>,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let key = key.cache_key();
        match self.records.entry(key.clone()) {
            Entry::Occupied(mut existing) => {
                if existing.get().fetched_at <= fetched_at {
                    existing.insert(CacheRecord::new(key, entries, fetched_at));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(CacheRecord::new(key, entries, fetched_at));
            }
        }
        Ok(())
    }

    async fn index_entries(&self, entries: &[NewsEntry]) -> Result<usize, StoreError> {
        let mut inserted = 0;
        for entry in entries {
            if let Entry::Vacant(slot) = self.archive.entry(entry.url.clone()) {
                slot.insert(entry.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Utc::now();
        let before = self.records.len();
        self.records.retain(|_, record| record.is_fresh(now, self.ttl));
        Ok(before.saturating_sub(self.records.len()))
    }
}
