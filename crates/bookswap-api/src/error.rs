use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors handlers return. Everything renders as a JSON body of the form
/// `{"message": ...}`, with a `"field"` key on validation failures.
/// Internal errors are logged in full and reach the wire as a generic 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: None,
            message: message.into(),
        }
    }

    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { field, message } => {
                let mut body = json!({ "message": message });
                if let Some(field) = field {
                    body["field"] = json!(field);
                }
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "unauthorized" }),
            ),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, json!({ "message": message })),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "message": message })),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, json!({ "message": message })),
            ApiError::Internal(err) => {
                error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Blocking DB work runs on the tokio blocking pool; a join failure is an
/// internal error like any other.
impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", err))
    }
}
