use serde::Serialize;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::profile::InputValidationError;

/// Where a model answer was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStage {
    Parse,
    Schema,
}

/// Every way `generate_career_report` can fail. The pipeline never logs these;
/// the caller decides how to surface them.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Client-fixable; raised before any model call.
    #[error("Invalid profile: {0}")]
    Input(#[from] InputValidationError),

    /// Misdeployment, e.g. no provider credential.
    #[error("Model client misconfigured: {0}")]
    Configuration(String),

    /// Timeout, non-2xx or empty content from the provider.
    #[error("Model request failed: {0}")]
    Transport(LlmError),

    /// The model answered, but not with an acceptable report.
    #[error("{message}")]
    Output { stage: OutputStage, message: String },
}

impl From<LlmError> for ReportError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey => ReportError::Configuration(err.to_string()),
            other => ReportError::Transport(other),
        }
    }
}

impl ReportError {
    /// Stable machine-readable classification.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Input(_) => "input",
            ReportError::Configuration(_) => "configuration",
            ReportError::Transport(_) => "transport",
            ReportError::Output { .. } => "output",
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, ReportError::Transport(e) if e.is_timeout())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ReportError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the same request may succeed later without changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReportError::Transport(_) | ReportError::Output { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_key_maps_to_configuration() {
        let err = ReportError::from(LlmError::MissingApiKey);
        assert_eq!(err.kind(), "configuration");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_timeout_maps_to_transport() {
        let err = ReportError::from(LlmError::Timeout {
            timeout: Duration::from_secs(60),
        });
        assert_eq!(err.kind(), "transport");
        assert!(err.timed_out());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("60s"));
    }

    #[test]
    fn test_api_error_keeps_status() {
        let err = ReportError::from(LlmError::Api {
            status: 429,
            body: "slow down".to_string(),
        });
        assert_eq!(err.status(), Some(429));
        assert!(!err.timed_out());
    }

    #[test]
    fn test_output_stage_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OutputStage::Schema).unwrap(),
            r#""schema""#
        );
    }
}
