//! Stored submissions.
//!
//! Layout:
//!   .corrige/submissions/<id>.yaml  one file per analysed text
//!
//! Ids are uuid v4 strings; the tracking sheet refers back to them.

use crate::correction::{word_count, CorrectionRecord};
use crate::error::{CorrigeError, Result};
use crate::tracking::{normalize_name, TrackingRow};
use crate::types::{Level, TaskType};
use crate::{io, paths};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub student: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub level: Level,
    pub task_type: TaskType,
    pub original_text: String,
    pub word_count: usize,
    pub record: CorrectionRecord,
    /// Model that produced the record.
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        student: impl Into<String>,
        title: Option<String>,
        level: Level,
        task_type: TaskType,
        original_text: impl Into<String>,
        record: CorrectionRecord,
        model: impl Into<String>,
    ) -> Self {
        let original_text = original_text.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            student: student.into().trim().to_string(),
            title: title.filter(|t| !t.trim().is_empty()),
            level,
            task_type,
            word_count: word_count(&original_text),
            original_text,
            record,
            model: model.into(),
            created_at: Utc::now(),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::submission_path(root, &self.id);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        paths::validate_submission_id(id)?;
        let path = paths::submission_path(root, id);
        if !path.exists() {
            return Err(CorrigeError::SubmissionNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    /// Summary row for the tracking sheet.
    pub fn to_tracking_row(&self) -> TrackingRow {
        let c = &self.record.contextual;
        TrackingRow {
            submission_id: self.id.clone(),
            student: self.student.clone(),
            submitted_at: self.created_at,
            level: self.level,
            task_type: self.task_type,
            word_count: self.word_count,
            errors: self.record.error_counts(),
            total_errors: self.record.total_errors(),
            error_rate: self.record.error_rate(self.word_count),
            coherence: c.coherence.score,
            cohesion: c.cohesion.score,
            register: c.register.score,
            cultural_fit: c.cultural_fit.score,
            contextual_average: c.average(),
        }
    }
}

/// All stored submissions, newest first.
pub fn list(root: &Path) -> Result<Vec<Submission>> {
    let dir = paths::submissions_dir(root);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        let data = std::fs::read_to_string(&path)?;
        out.push(serde_yaml::from_str::<Submission>(&data)?);
    }
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(out)
}

/// Submissions for one student (case-insensitive name match), newest first.
pub fn list_for_student(root: &Path, student: &str) -> Result<Vec<Submission>> {
    let wanted = normalize_name(student);
    Ok(list(root)?
        .into_iter()
        .filter(|s| normalize_name(&s.student) == wanted)
        .collect())
}
