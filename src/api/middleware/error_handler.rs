//! Error handler for converting AppError to HTTP responses.
//!
//! Implements IntoResponse for AppError with the wire format
//! `{"error": "<message>"}`. Internal failure details are logged, never
//! returned to the caller.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::ErrorResponse;
use crate::error::AppError;

impl IntoResponse for AppError {
    /// Converts an AppError into an HTTP response.
    ///
    /// # Status Code Mapping
    /// - NotFound → 404 NOT_FOUND
    /// - Validation → 400 BAD_REQUEST
    /// - BadRequest → 400 BAD_REQUEST
    /// - ConnectionPool → 503 SERVICE_UNAVAILABLE
    /// - Database / Queue / Configuration / Internal → 500 INTERNAL_SERVER_ERROR
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound { entity } => {
                (StatusCode::NOT_FOUND, format!("{} not found", entity))
            }
            AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::ConnectionPool { source } => {
                tracing::error!(error = %source, "connection pool failure");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            AppError::Database { operation, source } => {
                tracing::error!(operation = %operation, error = %source, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Queue { source } => {
                tracing::error!(error = %source, "queue failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Configuration { key, source } => {
                tracing::error!(key = %key, error = %source, "configuration failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal { source } => {
                tracing::error!(error = %source, "internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
///
/// Useful for tests that only care about the mapping.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Database { .. }
        | AppError::Queue { .. }
        | AppError::Configuration { .. }
        | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    use crate::api::dto::CRON_REQUIRED_MESSAGE;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_renders_wire_body() {
        let response = AppError::task_not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({"error": "Task not found"}));
    }

    #[tokio::test]
    async fn validation_renders_exact_message() {
        let response = AppError::Validation {
            message: CRON_REQUIRED_MESSAGE.to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], CRON_REQUIRED_MESSAGE);
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let response = AppError::Internal {
            source: anyhow::anyhow!("connection string with secrets"),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "An internal error occurred");
    }

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            error_to_status_code(&AppError::task_not_found()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_to_status_code(&AppError::BadRequest {
                message: "bad".to_string()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_to_status_code(&AppError::ConnectionPool {
                source: anyhow::anyhow!("pool exhausted")
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
