use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::error::StoreError;

/// Body of every failed API response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A store call failed; `message` is what the client sees
    #[error("{message}: {source}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl ApiError {
    /// Wrap a store error with the message shown to the client
    pub fn store(message: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Store { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store { source, .. } => match source {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::Validation(_) => StatusCode::BAD_REQUEST,
                StoreError::Remote { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Validation messages describe the caller's input and are safe to echo
            ApiError::Store {
                source: StoreError::Validation(detail),
                ..
            } => detail.clone(),
            ApiError::Store { message, source } => {
                if status.is_server_error() {
                    error!("{}: {}", message, source);
                } else {
                    warn!("{}: {}", message, source);
                }
                message.to_string()
            }
            ApiError::BadRequest(detail) => detail.clone(),
            ApiError::Unauthorized => "Unauthorized".to_string(),
        };

        let body = ErrorBody {
            success: false,
            error: message,
        };
        (status, Json(body)).into_response()
    }
}
