//! Validated JSON extractor.
//!
//! Deserializes the request body, runs `validator` rules, and turns both
//! rejection kinds into `AppError` so handlers only see validated input.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest {
                message: rejection.body_text(),
            })?;

        value.validate().map_err(|errors| AppError::Validation {
            message: first_validation_message(&errors),
        })?;

        Ok(ValidatedJson(value))
    }
}

/// Picks the first human-readable message out of a validation error tree.
fn first_validation_message(errors: &ValidationErrors) -> String {
    for kind in errors.errors().values() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                if let Some(error) = field_errors.first() {
                    if let Some(message) = &error.message {
                        return message.to_string();
                    }
                    return error.code.to_string();
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                return first_validation_message(nested);
            }
            ValidationErrorsKind::List(items) => {
                if let Some(nested) = items.values().next() {
                    return first_validation_message(nested);
                }
            }
        }
    }
    "Validation failed".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};

    use crate::api::dto::{CRON_REQUIRED_MESSAGE, CreateTaskRequest};

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/tasks")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_body() {
        let request = json_request(r#"{"type":"recurring","cron":"30 17 * * *"}"#);
        let result = ValidatedJson::<CreateTaskRequest>::from_request(request, &()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_required_field_yields_exact_message() {
        let request = json_request(r#"{"type":"recurring"}"#);
        let error = ValidatedJson::<CreateTaskRequest>::from_request(request, &())
            .await
            .unwrap_err();

        match error {
            AppError::Validation { message } => assert_eq!(message, CRON_REQUIRED_MESSAGE),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let request = json_request(r#"{"type": recurring"#);
        let error = ValidatedJson::<CreateTaskRequest>::from_request(request, &())
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn unknown_kind_is_bad_request() {
        let request = json_request(r#"{"type":"hourly"}"#);
        let error = ValidatedJson::<CreateTaskRequest>::from_request(request, &())
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::BadRequest { .. }));
    }
}
