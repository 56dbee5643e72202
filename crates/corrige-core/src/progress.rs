use crate::tracking::TrackingRow;
use crate::types::ErrorCategory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressPoint {
    pub submitted_at: DateTime<Utc>,
    pub error_rate: f32,
    pub contextual_average: f32,
    pub total_errors: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: ErrorCategory,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextualAverages {
    pub coherence: f32,
    pub cohesion: f32,
    pub register: f32,
    pub cultural_fit: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub submissions: usize,
    pub first_at: Option<DateTime<Utc>>,
    pub last_at: Option<DateTime<Utc>>,
    pub average_error_rate: f32,
    /// Mean error rate of the later half minus the earlier half.
    /// Negative means fewer errors over time.
    pub error_rate_trend: Option<f32>,
    /// Descending by count; ties keep category order.
    pub category_totals: Vec<CategoryTotal>,
    pub top_category: Option<ErrorCategory>,
    pub contextual_averages: Option<ContextualAverages>,
    pub points: Vec<ProgressPoint>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, n) = values.fold((0.0f32, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f32
    }
}

/// Summarize a student's rows. Rows are sorted by submission time first, so
/// callers may pass them in any order.
pub fn summarize(rows: &[TrackingRow]) -> ProgressSummary {
    let mut sorted: Vec<&TrackingRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));

    let points: Vec<ProgressPoint> = sorted
        .iter()
        .map(|r| ProgressPoint {
            submitted_at: r.submitted_at,
            error_rate: r.error_rate,
            contextual_average: r.contextual_average,
            total_errors: r.total_errors,
        })
        .collect();

    let error_rate_trend = if sorted.len() < 2 {
        None
    } else {
        // Odd counts leave the middle row in the later half.
        let mid = sorted.len() / 2;
        let early = mean(sorted[..mid].iter().map(|r| r.error_rate));
        let late = mean(sorted[mid..].iter().map(|r| r.error_rate));
        Some(late - early)
    };

    let mut totals: BTreeMap<ErrorCategory, u32> = BTreeMap::new();
    for r in &sorted {
        for (cat, n) in &r.errors {
            *totals.entry(*cat).or_default() += n;
        }
    }
    let mut category_totals: Vec<CategoryTotal> = totals
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(category, count)| CategoryTotal { category, count })
        .collect();
    // Stable sort keeps category order for equal counts.
    category_totals.sort_by(|a, b| b.count.cmp(&a.count));
    let top_category = category_totals.first().map(|c| c.category);

    let contextual_averages = if sorted.is_empty() {
        None
    } else {
        Some(ContextualAverages {
            coherence: mean(sorted.iter().map(|r| r.coherence as f32)),
            cohesion: mean(sorted.iter().map(|r| r.cohesion as f32)),
            register: mean(sorted.iter().map(|r| r.register as f32)),
            cultural_fit: mean(sorted.iter().map(|r| r.cultural_fit as f32)),
        })
    };

    ProgressSummary {
        submissions: sorted.len(),
        first_at: sorted.first().map(|r| r.submitted_at),
        last_at: sorted.last().map(|r| r.submitted_at),
        average_error_rate: mean(sorted.iter().map(|r| r.error_rate)),
        error_rate_trend,
        category_totals,
        top_category,
        contextual_averages,
        points,
    }
}
