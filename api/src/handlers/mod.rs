pub mod cron;
pub mod health;
pub mod recurring;
pub mod tasks;
pub mod templates;

// Common response types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use common::dates::parse_iso_date;
use common::errors::{EngineError, ErrorKind, ValidationError};
use serde::Serialize;

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub trace_id: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "validation_error" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            "conflict" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EngineError> for ErrorResponse {
    fn from(err: EngineError) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Store {
            tracing::error!(error = %err, "Store failure while handling request");
        }
        Self::new(kind.as_str(), err.to_string())
    }
}

impl From<ValidationError> for ErrorResponse {
    fn from(err: ValidationError) -> Self {
        EngineError::from(err).into()
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Standard API success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for SuccessResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Parse an ISO date from a request field into a 400 on failure
pub(crate) fn request_date(field: &str, value: &str) -> Result<NaiveDate, ErrorResponse> {
    parse_iso_date(field, value).map_err(|e| {
        ErrorResponse::from(e).with_details(serde_json::json!({ "field": field, "value": value }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::errors::StorageError;
    use uuid::Uuid;

    #[test]
    fn test_engine_errors_map_to_status_codes() {
        let cases = [
            (
                EngineError::Validation(ValidationError::MissingField("startDate".into())),
                StatusCode::BAD_REQUEST,
            ),
            (EngineError::TemplateNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (EngineError::TaskNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (
                EngineError::Store(StorageError::DuplicateKey("bundles_template_occurrence".into())),
                StatusCode::CONFLICT,
            ),
            (
                EngineError::Store(StorageError::DatabaseError("pool timed out".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ErrorResponse::from(err).status(), expected);
        }
    }

    #[test]
    fn test_request_date_reports_field() {
        let err = request_date("anchorDate", "10/03/2026").unwrap_err();
        assert_eq!(err.error, "validation_error");
        assert_eq!(
            err.details,
            Some(serde_json::json!({ "field": "anchorDate", "value": "10/03/2026" }))
        );
    }
}
