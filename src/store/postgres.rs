use std::{str::FromStr, time::Duration as StdDuration};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    types::Json,
    PgPool,
};
use tracing::info;

use crate::models::{
    cache::{CacheRecord, CACHE_TTL},
    news::NewsEntry,
    query::QueryDescriptor,
};
use crate::store::{Store, StoreError};

const SCHEMA: [&str; 3] = [
    r#"CREATE TABLE IF NOT EXISTS cached_results (
        key TEXT PRIMARY KEY,
        entries JSONB NOT NULL,
        fetched_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS cached_results_fetched_at ON cached_results (fetched_at)"#,
    r#"CREATE TABLE IF NOT EXISTS news_entries (
        url TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        source_id TEXT,
        source_name TEXT NOT NULL,
        url_to_image TEXT,
        published_at TEXT NOT NULL,
        author TEXT NOT NULL,
        description TEXT NOT NULL,
        content TEXT NOT NULL
    )"#,
];

/// Postgres-backed store: `cached_results` expires with the TTL,
/// `news_entries` is unique by url and never expires.
pub struct PgStore {
    pool: PgPool,
    ttl: Duration,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        Self::connect_with_ttl(database_url, CACHE_TTL).await
    }

    pub async fn connect_with_ttl(database_url: &str, ttl: Duration) -> Result<Self, StoreError> {
        let connect_options = PgConnectOptions::from_str(database_url)?.statement_cache_capacity(0);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(StdDuration::from_secs(10))
            .idle_timeout(Some(StdDuration::from_secs(60)))
            .connect_with(connect_options)
            .await?;

        let store = Self { pool, ttl };
        store.migrate().await?;
        info!("Database connection pool created successfully");
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn cutoff(&self) -> DateTime<Utc> {
        Utc::now() - self.ttl
    }

    #[cfg(test)]
    pub async fn archived(&self, url: &str) -> Result<Option<String>, StoreError> {
        let title: Option<(String,)> = sqlx::query_as("SELECT title FROM news_entries WHERE url = $1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(title.map(|(title,)| title))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn lookup(&self, key: &QueryDescriptor) -> Result<Option<CacheRecord>, StoreError> {
        let row: Option<(String, serde_json::Value, DateTime<Utc>)> = sqlx::query_as(
            "SELECT key, entries, fetched_at FROM cached_results WHERE key = $1 AND fetched_at > $2",
        )
        .bind(key.cache_key())
        .bind(self.cutoff())
        .fetch_optional(&self.pool)
        .await?;

        let Some((key, entries, fetched_at)) = row else {
            return Ok(None);
        };
        let entries: Vec<NewsEntry> = serde_json::from_value(entries)
            .map_err(|source| StoreError::Corrupted {
                key: key.clone(),
                source,
            })?;
        Ok(Some(CacheRecord::new(key, entries, fetched_at)))
    }

    async fn put(
        &self,
        key: &QueryDescriptor,
        entries: Vec<NewsEntry>,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO cached_results (key, entries, fetched_at)
               VALUES ($1, $2, $3)
               ON CONFLICT (key) DO UPDATE
               SET entries = EXCLUDED.entries, fetched_at = EXCLUDED.fetched_at
               WHERE cached_results.fetched_at <= EXCLUDED.fetched_at"#,
        )
        .bind(key.cache_key())
        .bind(Json(&entries))
        .bind(fetched_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn index_entries(&self, entries: &[NewsEntry]) -> Result<usize, StoreError> {
        let mut inserted = 0;
        for entry in entries {
            let result = sqlx::query(
                r#"INSERT INTO news_entries
                   (url, title, source_id, source_name, url_to_image, published_at, author, description, content)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                   ON CONFLICT (url) DO NOTHING"#,
            )
            .bind(&entry.url)
            .bind(&entry.title)
            .bind(&entry.source.id)
            .bind(&entry.source.name)
            .bind(&entry.url_to_image)
            .bind(&entry.published_at)
            .bind(&entry.author)
            .bind(&entry.description)
            .bind(&entry.content)
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected() as usize;
        }
        Ok(inserted)
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let result = sqlx::query("DELETE FROM cached_results WHERE fetched_at <= $1")
            .bind(self.cutoff())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as usize)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Disconnected from the database");
    }
}
