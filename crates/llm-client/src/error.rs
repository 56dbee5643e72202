use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("no valid structured output after {attempts} attempt(s): {last_error}")]
    InvalidStructuredOutput { attempts: u32, last_error: String },

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl LlmError {
    /// Transient failures worth another transport attempt: rate limiting,
    /// server-side errors, timeouts and refused connections.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
