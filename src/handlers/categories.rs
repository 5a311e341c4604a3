use axum::{response::IntoResponse, Json};
use http::StatusCode;
use serde_json::json;

use crate::models::query::{Category, ANY_CATEGORY};

pub async fn get_categories() -> impl IntoResponse {
    let categories: Vec<_> = std::iter::once(ANY_CATEGORY)
        .chain(Category::ALL.iter().map(Category::as_str))
        .map(|c| json!({"value": c, "text": c}))
        .collect();

    (StatusCode::OK, Json(json!({ "categories": categories })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn lists_any_then_every_category() {
        let res = get_categories().await.into_response();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        let categories = json["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 15);
        assert_eq!(categories[0], json!({"value": "Any", "text": "Any"}));
        assert_eq!(categories[14]["value"], "World_MiddleEast");
    }
}
