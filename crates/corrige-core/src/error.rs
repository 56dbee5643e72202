use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorrigeError {
    #[error("not initialized: run 'corrige init'")]
    NotInitialized,

    #[error("submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("student not found: {0}")]
    StudentNotFound(String),

    #[error("invalid submission id '{0}'")]
    InvalidSubmissionId(String),

    #[error("invalid level '{0}': expected one of A1, A2, B1, B2, C1, C2")]
    InvalidLevel(String),

    #[error("invalid task type: {0}")]
    InvalidTaskType(String),

    #[error("invalid export format '{0}': expected csv, html or markdown")]
    InvalidExportFormat(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid correction record: {0}")]
    InvalidCorrection(String),

    #[error("malformed tracking row at line {line}: {reason}")]
    TrackingRow { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CorrigeError>;
