use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use reqwest::Client;
use thiserror::Error;

use crate::models::{
    news::{NewsEntry, UpstreamResponse},
    query::QueryDescriptor,
};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Any of these means the upstream gave us nothing usable for this request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Unavailable(#[from] reqwest::Error),
    #[error("upstream responded with {0}")]
    Status(StatusCode),
    #[error("upstream returned an empty body")]
    EmptyBody,
    #[error("unexpected upstream payload: {0}")]
    Mapping(String),
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, query: &QueryDescriptor) -> Result<Vec<NewsEntry>, FetchError>;
}

/// Client for the Bing News Search v7 API.
#[derive(Clone)]
pub struct BingFetcher {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl BingFetcher {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent("NewsCache/1.0")
            .build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn endpoint(&self, query: &QueryDescriptor) -> (String, Vec<(&'static str, String)>) {
        let (path, params) = query.upstream_request();
        (format!("{}/{}", self.base_url, path), params)
    }
}

#[async_trait]
impl Fetcher for BingFetcher {
    async fn fetch(&self, query: &QueryDescriptor) -> Result<Vec<NewsEntry>, FetchError> {
        let (url, params) = self.endpoint(query);
        let res = self
            .http_client
            .get(url)
            .query(&params)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = res.text().await?;
        parse_response(&body)
    }
}

pub fn parse_response(body: &str) -> Result<Vec<NewsEntry>, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::EmptyBody);
    }
    let payload: Option<UpstreamResponse> =
        serde_json::from_str(body).map_err(|e| FetchError::Mapping(e.to_string()))?;
    let payload = payload.ok_or(FetchError::EmptyBody)?;

    payload
        .value
        .into_iter()
        .map(|article| {
            let url = article.url.clone();
            article
                .into_entry()
                .ok_or_else(|| FetchError::Mapping(format!("article {url} has no provider")))
        })
        .collect()
}
