use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use serde_json::Value;
use tracing::error;

use crate::models::query::ValidationError;
use crate::services::news_cache::ResolveError;
use crate::store::StoreError;

#[derive(Debug)]
pub struct Error {
    pub code: StatusCode,
    pub body: Json<Value>,
}

impl Error {
    pub fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            body: Json(json!({"message": message})),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.code, self.body).into_response()
    }
}

// Clients read the rejection as a bare JSON string, not a `{message}` object.
impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Self {
            code: StatusCode::UNAUTHORIZED,
            body: Json(Value::String(error.to_string())),
        }
    }
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        error!("Cache store failure: {:?}", error);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Cache store unavailable")
    }
}

impl From<ResolveError> for Error {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::Validation(e) => e.into(),
            ResolveError::Store(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::new(StatusCode::BAD_REQUEST, &format!("Malformed request body: {}", error))
    }
}
