//! Error types for the store and the HTTP boundary.
//!
//! # Design
//! Handlers only distinguish two outcomes: the id has no record (404) and
//! everything else the store can fail with (500). The store error text is
//! forwarded verbatim in the response body; nothing is retried.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures raised by a `TodoStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid todo id `{id}`: {source}")]
    InvalidId {
        id: String,
        #[source]
        source: uuid::Error,
    },

    #[error("unsupported store url `{0}`")]
    UnsupportedUrl(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored document is malformed: {0}")]
    Document(#[from] serde_json::Error),

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("store is closed")]
    Closed,
}

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Todo not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(err) => {
                tracing::error!(error = %err, "store operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_maps_to_404_with_message() {
        let (status, body) = body_of(ApiError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Todo not found");
    }

    #[tokio::test]
    async fn store_failure_forwards_error_text_as_500() {
        let (status, body) = body_of(ApiError::Store(StoreError::Closed)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "store is closed");
    }
}
