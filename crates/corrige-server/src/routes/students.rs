use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use corrige_core::export::{self, ExportFormat};
use corrige_core::progress;
use corrige_core::tracking::{self, TrackingRow};
use corrige_core::CorrigeError;
use std::path::PathBuf;

use crate::error::AppError;
use crate::routes::{attachment, file_stem, join_error};
use crate::state::AppState;

/// Tracking rows for `student`, oldest first. No rows means an unknown student.
fn student_rows(root: &std::path::Path, student: &str) -> Result<Vec<TrackingRow>, CorrigeError> {
    let rows = tracking::history(root, student)?;
    if rows.is_empty() {
        return Err(CorrigeError::StudentNotFound(student.to_string()));
    }
    Ok(rows)
}

async fn rows_for(root: PathBuf, student: String) -> Result<Vec<TrackingRow>, AppError> {
    let rows = tokio::task::spawn_blocking(move || student_rows(&root, &student))
        .await
        .map_err(join_error)??;
    Ok(rows)
}

/// GET /api/students — every student on the tracking sheet.
pub async fn list_students(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let students = tracking::students(&root)?;
        Ok::<_, CorrigeError>(serde_json::to_value(students)?)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(result))
}

/// GET /api/students/{student}/history
pub async fn student_history(
    State(app): State<AppState>,
    Path(student): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let rows = rows_for(app.root.clone(), student).await?;
    Ok(Json(serde_json::to_value(rows)?))
}

/// GET /api/students/{student}/progress
pub async fn student_progress(
    State(app): State<AppState>,
    Path(student): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let rows = rows_for(app.root.clone(), student).await?;
    let name = rows[0].student.clone();
    let summary = progress::summarize(&rows);
    Ok(Json(serde_json::json!({
        "student": name,
        "summary": summary,
    })))
}

/// GET /api/students/{student}/export — history as CSV.
pub async fn export_student(
    State(app): State<AppState>,
    Path(student): Path<String>,
) -> Result<Response, AppError> {
    let rows = rows_for(app.root.clone(), student).await?;
    let filename = format!("{}-history.csv", file_stem(&rows[0].student));
    Ok(attachment(
        export::tracking_csv(&rows),
        ExportFormat::Csv.content_type(),
        &filename,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::scripted_state;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn seed(root: &std::path::Path) {
        for (i, name) in ["Ana", "Luis", "ana "].iter().enumerate() {
            let row = TrackingRow {
                submission_id: format!("00000000-0000-4000-8000-00000000000{i}"),
                student: name.to_string(),
                submitted_at: chrono::Utc::now() + chrono::Duration::seconds(i as i64),
                level: corrige_core::types::Level::B1,
                task_type: corrige_core::types::TaskType::Essay,
                word_count: 100,
                errors: Default::default(),
                total_errors: 5 - i as u32,
                error_rate: 5.0 - i as f32,
                coherence: 7,
                cohesion: 7,
                register: 7,
                cultural_fit: 7,
                contextual_average: 7.0,
            };
            tracking::append(root, &row).unwrap();
        }
    }

    #[tokio::test]
    async fn students_are_merged_case_insensitively() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(dir.path());
        let app = scripted_state(dir.path(), &[], false);
        let json = list_students(State(app)).await.unwrap().0;
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["name"], "Ana");
        assert_eq!(list[0]["submissions"], 2);
    }

    #[tokio::test]
    async fn progress_reports_summary() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(dir.path());
        let app = scripted_state(dir.path(), &[], false);
        let json = student_progress(State(app), Path("ANA".into()))
            .await
            .unwrap()
            .0;
        assert_eq!(json["student"], "Ana");
        assert_eq!(json["summary"]["submissions"], 2);
    }

    #[tokio::test]
    async fn unknown_student_is_404() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = scripted_state(dir.path(), &[], false);
        let err = student_history(State(app), Path("nadie".into()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn export_is_csv_attachment() {
        let dir = tempfile::TempDir::new().unwrap();
        seed(dir.path());
        let app = scripted_state(dir.path(), &[], false);
        let resp = export_student(State(app), Path("luis".into())).await.unwrap();
        assert_eq!(
            resp.headers()[axum::http::header::CONTENT_DISPOSITION],
            "attachment; filename=\"luis-history.csv\""
        );
    }
}
