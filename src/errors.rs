use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Any rejected storage operation. The message is passed through to the
    /// client unredacted.
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("Resource not found")]
    NotFound,
    #[error("Forbidden")]
    Forbidden,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// A request body that is not valid JSON (400) or does not fit the
    /// expected shape (422)
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                tracing::error!(error = %err, "storage operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::InvalidBody(rejection) => (rejection.status(), rejection.body_text()),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
