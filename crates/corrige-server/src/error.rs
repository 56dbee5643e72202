use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use corrige_core::error::CorrigeError;
use llm_client::LlmError;

use crate::analysis::AnalysisError;

// ---------------------------------------------------------------------------
// Internal sentinel
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 503 through the `anyhow::Error` chain.
#[derive(Debug)]
struct UnavailableError(String);

impl std::fmt::Display for UnavailableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UnavailableError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// 503 Service Unavailable.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self(UnavailableError(msg.into()).into())
    }
}

fn core_status(e: &CorrigeError) -> StatusCode {
    match e {
        CorrigeError::NotInitialized => StatusCode::BAD_REQUEST,
        CorrigeError::SubmissionNotFound(_) | CorrigeError::StudentNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        CorrigeError::InvalidSubmissionId(_)
        | CorrigeError::InvalidLevel(_)
        | CorrigeError::InvalidTaskType(_)
        | CorrigeError::InvalidExportFormat(_)
        | CorrigeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CorrigeError::InvalidCorrection(_) => StatusCode::BAD_GATEWAY,
        CorrigeError::TrackingRow { .. }
        | CorrigeError::Io(_)
        | CorrigeError::Yaml(_)
        | CorrigeError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn llm_status(e: &LlmError) -> StatusCode {
    match e {
        LlmError::Unsupported(_) => StatusCode::BAD_REQUEST,
        LlmError::Http(_)
        | LlmError::Api { .. }
        | LlmError::EmptyResponse
        | LlmError::InvalidStructuredOutput { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<UnavailableError>().is_some() {
            return StatusCode::SERVICE_UNAVAILABLE;
        }
        if let Some(e) = self.0.downcast_ref::<AnalysisError>() {
            return match e {
                AnalysisError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                AnalysisError::Core(e) => core_status(e),
                AnalysisError::Llm(e) => llm_status(e),
            };
        }
        if let Some(e) = self.0.downcast_ref::<CorrigeError>() {
            return core_status(e);
        }
        if let Some(e) = self.0.downcast_ref::<LlmError>() {
            return llm_status(e);
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), %status, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
