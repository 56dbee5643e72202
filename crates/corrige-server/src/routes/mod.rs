pub mod config;
pub mod criteria;
pub mod events;
pub mod students;
pub mod submissions;

use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

pub(crate) fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError(anyhow::anyhow!("task join error: {e}"))
}

/// ASCII-only file name stem for Content-Disposition headers.
pub(crate) fn file_stem(name: &str) -> String {
    let mut out = String::new();
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let out = out.trim_end_matches('-').to_string();
    if out.is_empty() {
        "corrige".to_string()
    } else {
        out
    }
}

/// Raw body served as a download.
pub(crate) fn attachment(body: impl Into<Vec<u8>>, content_type: &str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body.into(),
    )
        .into_response()
}
