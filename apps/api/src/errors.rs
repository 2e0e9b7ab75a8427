use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::report::ReportError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Report error: {0}")]
    Report(ReportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Input(e) => AppError::Validation(e.to_string()),
            other => AppError::Report(other),
        }
    }
}

impl AppError {
    /// Whether resending the same request later may succeed.
    pub fn retryable(&self) -> bool {
        match self {
            AppError::RateLimited { .. } => true,
            AppError::Report(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Too many reports requested. Please try again in {retry_after_secs} seconds."),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Report(e) => report_error_parts(e),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "retryable": self.retryable()
            }
        }));

        let mut response = (status, body).into_response();
        if let AppError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

fn report_error_parts(err: &ReportError) -> (StatusCode, &'static str, String) {
    match err {
        ReportError::Input(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
        ReportError::Configuration(msg) => {
            tracing::error!("Model client misconfigured: {msg}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                "The report service is not configured correctly".to_string(),
            )
        }
        ReportError::Transport(e) if err.timed_out() => {
            tracing::warn!("Model call timed out: {e}");
            (
                StatusCode::GATEWAY_TIMEOUT,
                "MODEL_TIMEOUT",
                "The AI service took too long to respond. Please try again later.".to_string(),
            )
        }
        ReportError::Transport(e) => {
            tracing::error!(kind = err.kind(), "Model transport error (status {:?}): {e}", err.status());
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "MODEL_UNAVAILABLE",
                "The AI service is temporarily unavailable. Please try again later.".to_string(),
            )
        }
        ReportError::Output { stage, message } => {
            tracing::error!(kind = err.kind(), "Model output rejected at {stage:?} stage: {message}");
            (
                StatusCode::BAD_GATEWAY,
                "REPORT_GENERATION_FAILED",
                "Something went wrong while generating your report. Please try again.".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::report::error::OutputStage;
    use std::time::Duration;

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AppError::RateLimited {
            retry_after_secs: 120,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "120");
    }

    #[test]
    fn test_report_errors_map_to_distinct_statuses() {
        let cases = [
            (
                AppError::from(ReportError::from(LlmError::Timeout {
                    timeout: Duration::from_secs(60),
                })),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                AppError::from(ReportError::from(LlmError::EmptyContent)),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::from(ReportError::Output {
                    stage: OutputStage::Parse,
                    message: "bad".to_string(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::from(ReportError::from(LlmError::MissingApiKey)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_retryable_flag() {
        assert!(AppError::RateLimited { retry_after_secs: 1 }.retryable());
        assert!(AppError::from(ReportError::from(LlmError::EmptyContent)).retryable());
        assert!(!AppError::Validation("bad".to_string()).retryable());
        assert!(!AppError::from(ReportError::from(LlmError::MissingApiKey)).retryable());
    }
}
