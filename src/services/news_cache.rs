use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    models::{
        news::NewsEntry,
        query::{QueryDescriptor, RawParams, ValidationError},
    },
    services::fetcher::Fetcher,
    store::{Store, StoreError},
};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Upstream,
    /// The upstream call failed; the result is empty and nothing was stored.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub entries: Vec<NewsEntry>,
    pub age_millis: i64,
    pub origin: Origin,
}

/// Read-through cache in front of the upstream news API.
///
/// Concurrent misses for the same query are not coalesced: each one calls the
/// upstream and writes its result, and the store keeps the latest fetch.
#[derive(Clone)]
pub struct NewsCache {
    store: Arc<dyn Store>,
    fetcher: Arc<dyn Fetcher>,
}

impl NewsCache {
    pub fn new(store: Arc<dyn Store>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { store, fetcher }
    }

    pub async fn resolve(&self, raw: Option<RawParams>) -> Result<Resolution, ResolveError> {
        let query = QueryDescriptor::normalize(raw)?;

        if let Some(record) = self.store.lookup(&query).await? {
            let age_millis = record.age_millis(Utc::now());
            info!(
                "Results for {} are cached: last updated {:.2} minutes ago",
                query,
                age_millis as f64 / 60_000.0
            );
            return Ok(Resolution {
                entries: record.entries,
                age_millis,
                origin: Origin::Cache,
            });
        }

        info!("Fetching {} from the news API", query);
        let entries = match self.fetcher.fetch(&query).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("News API unavailable for {}: {}", query, e);
                return Ok(Resolution {
                    entries: Vec::new(),
                    age_millis: 0,
                    origin: Origin::Unavailable,
                });
            }
        };

        self.store.put(&query, entries.clone(), Utc::now()).await?;
        let archived = self.store.index_entries(&entries).await?;
        info!("Cached {} entries for {} ({} newly archived)", entries.len(), query, archived);

        Ok(Resolution {
            entries,
            age_millis: 0,
            origin: Origin::Upstream,
        })
    }
}
