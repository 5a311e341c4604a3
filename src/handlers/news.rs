use std::sync::Arc;

use crate::{
    models::{error::Error, query::RawParams},
    services::news_cache::Origin,
    utils::state::AppState,
};
use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize, Debug, Default)]
pub struct NewsRequest {
    #[serde(default)]
    pub params: Option<RawParams>,
}

pub async fn get_news(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, Error> {
    // An empty body is the same as sending no params.
    let request: NewsRequest = if body.iter().all(u8::is_ascii_whitespace) {
        NewsRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };

    let res = state.news_cache.resolve(request.params).await?;
    let code = match res.origin {
        Origin::Cache | Origin::Upstream => StatusCode::OK,
        Origin::Unavailable => StatusCode::BAD_REQUEST,
    };

    Ok((
        code,
        Json(json!({ "news": res.entries, "lastUpdated": res.age_millis })),
    ))
}
