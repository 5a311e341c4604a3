use std::{env, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub news_api_url: String,
    pub news_api_key: String,
    pub cache_backend: CacheBackend,
    pub db_url: String,
    pub origins: Vec<String>,
    pub methods: Vec<String>,
    pub host: String,
    pub port: u16,
    pub upstream_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Config {
    pub fn init() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &'static str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let cache_backend = match var("CACHE_BACKEND", "postgres").to_lowercase().as_str() {
            "postgres" => CacheBackend::Postgres,
            "memory" => CacheBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "CACHE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        Ok(Config {
            news_api_url: var("NEWS_API_URL", "https://api.bing.microsoft.com/v7.0"),
            news_api_key: lookup("NEWS_API_KEY").ok_or(ConfigError::Missing("NEWS_API_KEY"))?,
            cache_backend,
            db_url: var("DATABASE_URL", "postgres://localhost:5432/news"),
            origins: split_list(&var("ORIGINS", "")),
            methods: split_list(&var("METHODS", "GET,POST")),
            host: var("HOST", "127.0.0.1"),
            port: parse("PORT", &var("PORT", "8080"))?,
            upstream_timeout: Duration::from_secs(parse(
                "UPSTREAM_TIMEOUT_SECS",
                &var("UPSTREAM_TIMEOUT_SECS", "5"),
            )?),
            sweep_interval: Duration::from_secs(parse(
                "SWEEP_INTERVAL_SECS",
                &var("SWEEP_INTERVAL_SECS", "60"),
            )?),
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
