//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Core error: {0}")]
    Core(#[from] dockerhub_core::CoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("Scrape failed: {}", self);

        (status, self.to_string()).into_response()
    }
}
