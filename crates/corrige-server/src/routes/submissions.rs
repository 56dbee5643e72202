use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use corrige_core::config::Config;
use corrige_core::criteria::{length_check, level_guidance};
use corrige_core::export::{self, ExportFormat};
use corrige_core::submission::{self, Submission};
use corrige_core::types::{Level, TaskType};
use corrige_core::CorrigeError;

use crate::analysis::{self, AnalysisRequest};
use crate::error::AppError;
use crate::routes::{attachment, join_error};
use crate::state::AppState;

/// Full submission plus the figures the dashboard derives from it.
pub fn submission_json(sub: &Submission) -> serde_json::Value {
    serde_json::json!({
        "submission": sub,
        "error_counts": sub.record.error_counts(),
        "total_errors": sub.record.total_errors(),
        "error_rate": sub.record.error_rate(sub.word_count),
        "contextual_average": sub.record.contextual.average(),
        "guidance": level_guidance(sub.level),
        "length": length_check(sub.level, sub.word_count),
    })
}

fn summary_json(sub: &Submission) -> serde_json::Value {
    serde_json::json!({
        "id": sub.id,
        "student": sub.student,
        "title": sub.title,
        "level": sub.level,
        "task_type": sub.task_type,
        "word_count": sub.word_count,
        "total_errors": sub.record.total_errors(),
        "contextual_average": sub.record.contextual.average(),
        "created_at": sub.created_at,
    })
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct CreateSubmissionBody {
    #[serde(default)]
    student: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    task_type: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

fn parse_opt<T>(value: Option<String>) -> Result<Option<T>, CorrigeError>
where
    T: std::str::FromStr<Err = CorrigeError>,
{
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.parse())
        .transpose()
}

/// POST /api/submissions — analyse a text, persist it, return 201.
pub async fn create_submission(
    State(app): State<AppState>,
    Json(body): Json<CreateSubmissionBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let request = AnalysisRequest {
        student: body.student,
        text: body.text,
        level: parse_opt::<Level>(body.level)?,
        task_type: parse_opt::<TaskType>(body.task_type)?,
        title: body.title,
    };

    let root = app.root.clone();
    let config = tokio::task::spawn_blocking(move || Config::load_or_default(&root))
        .await
        .map_err(join_error)??;

    let sub = analysis::analyze(app.chat.as_ref(), &config, request).await?;

    let root = app.root.clone();
    let sub = tokio::task::spawn_blocking(move || {
        analysis::persist(&root, &sub)?;
        Ok::<_, CorrigeError>(sub)
    })
    .await
    .map_err(join_error)??;

    app.notify();
    Ok((StatusCode::CREATED, Json(submission_json(&sub))))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    student: Option<String>,
}

/// GET /api/submissions — newest first, optionally for one student.
pub async fn list_submissions(
    State(app): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let subs = match q.student.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(student) => submission::list_for_student(&root, student)?,
            None => submission::list(&root)?,
        };
        let list: Vec<serde_json::Value> = subs.iter().map(summary_json).collect();
        Ok::<_, CorrigeError>(serde_json::json!(list))
    })
    .await
    .map_err(join_error)??;

    Ok(Json(result))
}

/// GET /api/submissions/{id}
pub async fn get_submission(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let sub = Submission::load(&root, &id)?;
        Ok::<_, CorrigeError>(submission_json(&sub))
    })
    .await
    .map_err(join_error)??;

    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Export / audio
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    format: Option<String>,
}

/// GET /api/submissions/{id}/export?format=csv|html|markdown (default html).
pub async fn export_submission(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let format: ExportFormat = q.format.as_deref().unwrap_or("html").parse()?;
    let root = app.root.clone();
    let (body, id) = tokio::task::spawn_blocking(move || {
        let sub = Submission::load(&root, &id)?;
        Ok::<_, CorrigeError>((export::render(&sub, format), sub.id))
    })
    .await
    .map_err(join_error)??;

    let filename = format!("corrige-{id}.{}", format.extension());
    Ok(attachment(body, format.content_type(), &filename))
}

/// GET /api/submissions/{id}/audio — corrected text narrated as MP3.
pub async fn submission_audio(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(speech) = app.speech.clone() else {
        return Err(AppError::unavailable("speech narration is disabled"));
    };

    let root = app.root.clone();
    let sub = tokio::task::spawn_blocking(move || Submission::load(&root, &id))
        .await
        .map_err(join_error)??;

    let audio = speech.synthesize(&sub.record.corrected_text).await?;
    tracing::debug!(id = %sub.id, bytes = audio.len(), "narration generated");

    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"corrige-{}.mp3\"", sub.id),
            ),
        ],
        audio,
    )
        .into_response())
}
