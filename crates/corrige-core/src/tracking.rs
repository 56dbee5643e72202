//! Tracking sheet: one summary row per analysed submission.
//!
//! Layout:
//!   .corrige/tracking.jsonl  one JSON object per line, append-only
//!
//! Rows are never rewritten. History lookups are a linear scan with
//! case-insensitive student matching.

use crate::error::{CorrigeError, Result};
use crate::types::{ErrorCategory, Level, TaskType};
use crate::{io, paths};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRow {
    pub submission_id: String,
    pub student: String,
    pub submitted_at: DateTime<Utc>,
    pub level: Level,
    pub task_type: TaskType,
    pub word_count: usize,
    #[serde(default)]
    pub errors: BTreeMap<ErrorCategory, u32>,
    pub total_errors: u32,
    /// Errors per 100 words.
    pub error_rate: f32,
    pub coherence: u8,
    pub cohesion: u8,
    pub register: u8,
    pub cultural_fit: u8,
    pub contextual_average: f32,
}

impl TrackingRow {
    pub fn errors_in(&self, category: ErrorCategory) -> u32 {
        self.errors.get(&category).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentEntry {
    pub name: String,
    pub submissions: usize,
    pub last_submitted_at: DateTime<Utc>,
}

/// Trimmed, lowercased, inner whitespace collapsed.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append one row to the sheet.
pub fn append(root: &Path, row: &TrackingRow) -> Result<()> {
    let mut line = serde_json::to_string(row)?;
    line.push('\n');
    io::append_text(&paths::tracking_path(root), &line)
}

/// Every row in file order. A missing sheet is an empty sheet.
pub fn load_all(root: &Path) -> Result<Vec<TrackingRow>> {
    let path = paths::tracking_path(root);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)?;
    let mut rows = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(line).map_err(|e| CorrigeError::TrackingRow {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Rows for one student, oldest first.
pub fn history(root: &Path, student: &str) -> Result<Vec<TrackingRow>> {
    Ok(filter_student(load_all(root)?, student))
}

pub fn filter_student(rows: Vec<TrackingRow>, student: &str) -> Vec<TrackingRow> {
    let wanted = normalize_name(student);
    let mut out: Vec<TrackingRow> = rows
        .into_iter()
        .filter(|r| normalize_name(&r.student) == wanted)
        .collect();
    out.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
    out
}

/// Distinct students in order of first appearance. The spelling of the
/// first row seen for a student is the one reported.
pub fn students(root: &Path) -> Result<Vec<StudentEntry>> {
    let mut out: Vec<StudentEntry> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    for row in load_all(root)? {
        let key = normalize_name(&row.student);
        if key.is_empty() {
            continue;
        }
        match index.get(&key) {
            Some(&i) => {
                let entry = &mut out[i];
                entry.submissions += 1;
                if row.submitted_at > entry.last_submitted_at {
                    entry.last_submitted_at = row.submitted_at;
                }
            }
            None => {
                index.insert(key, out.len());
                out.push(StudentEntry {
                    name: row.student.trim().to_string(),
                    submissions: 1,
                    last_submitted_at: row.submitted_at,
                });
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
