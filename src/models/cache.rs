use chrono::{DateTime, Duration, Utc};

use crate::models::news::NewsEntry;

/// How long a fetched result set may be served from the cache.
pub const CACHE_TTL: Duration = Duration::minutes(30);

#[derive(Clone, Debug, PartialEq)]
pub struct CacheRecord {
    pub key: String,
    pub entries: Vec<NewsEntry>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheRecord {
    pub fn new(key: String, entries: Vec<NewsEntry>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            key,
            entries,
            fetched_at,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }

    pub fn age_millis(&self, now: DateTime<Utc>) -> i64 {
        self.age(now).num_milliseconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_boundary_is_exclusive() {
        let now = Utc::now();
        let record = CacheRecord::new("k".into(), vec![], now - CACHE_TTL);
        assert!(!record.is_fresh(now, CACHE_TTL));

        let record = CacheRecord::new("k".into(), vec![], now - CACHE_TTL + Duration::milliseconds(1));
        assert!(record.is_fresh(now, CACHE_TTL));
    }

    #[test]
    fn age_never_negative() {
        let now = Utc::now();
        let record = CacheRecord::new("k".into(), vec![], now + Duration::seconds(2));
        assert_eq!(record.age_millis(now), 0);
    }
}
