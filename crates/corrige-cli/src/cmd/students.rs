use crate::output::{fmt2, print_json, print_table};
use corrige_core::progress;
use corrige_core::tracking::{self, TrackingRow};
use corrige_core::CorrigeError;
use std::path::Path;

fn rows_for(root: &Path, student: &str) -> anyhow::Result<Vec<TrackingRow>> {
    let rows = tracking::history(root, student)?;
    if rows.is_empty() {
        return Err(CorrigeError::StudentNotFound(student.to_string()).into());
    }
    Ok(rows)
}

pub fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let students = tracking::students(root)?;
    if json {
        return print_json(&students);
    }
    if students.is_empty() {
        println!("No students yet.");
        return Ok(());
    }
    let rows = students
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.submissions.to_string(),
                s.last_submitted_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    print_table(&["STUDENT", "SUBMISSIONS", "LAST"], rows);
    Ok(())
}

pub fn history(root: &Path, student: &str, json: bool) -> anyhow::Result<()> {
    let rows = rows_for(root, student)?;
    if json {
        return print_json(&rows);
    }
    let table = rows
        .iter()
        .map(|r| {
            vec![
                r.submitted_at.format("%Y-%m-%d").to_string(),
                r.level.to_string(),
                r.task_type.as_str().to_string(),
                r.word_count.to_string(),
                r.total_errors.to_string(),
                fmt2(r.error_rate),
                format!("{:.1}", r.contextual_average),
            ]
        })
        .collect();
    print_table(
        &["DATE", "LEVEL", "TASK", "WORDS", "ERRORS", "ERR/100", "CONTEXT"],
        table,
    );
    Ok(())
}

pub fn progress(root: &Path, student: &str, json: bool) -> anyhow::Result<()> {
    let rows = rows_for(root, student)?;
    let summary = progress::summarize(&rows);
    if json {
        return print_json(&serde_json::json!({
            "student": rows[0].student,
            "summary": summary,
        }));
    }

    println!("{}: {} submissions", rows[0].student, summary.submissions);
    if let (Some(first), Some(last)) = (summary.first_at, summary.last_at) {
        println!(
            "  from {} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }
    println!("  average errors per 100 words: {}", fmt2(summary.average_error_rate));
    match summary.error_rate_trend {
        Some(t) if t < 0.0 => println!("  trend: improving ({} per 100 words)", fmt2(t)),
        Some(t) if t > 0.0 => println!("  trend: more errors (+{} per 100 words)", fmt2(t)),
        Some(_) => println!("  trend: steady"),
        None => println!("  trend: needs at least two submissions"),
    }
    if let Some(cat) = summary.top_category {
        println!("  most frequent: {}", cat.label());
    }
    if let Some(c) = &summary.contextual_averages {
        println!(
            "  contextual: coherence {:.1}, cohesion {:.1}, register {:.1}, cultural fit {:.1}",
            c.coherence, c.cohesion, c.register, c.cultural_fit
        );
    }

    let totals = summary
        .category_totals
        .iter()
        .filter(|t| t.count > 0)
        .map(|t| vec![t.category.label().to_string(), t.count.to_string()])
        .collect::<Vec<_>>();
    if !totals.is_empty() {
        println!();
        print_table(&["CATEGORY", "ERRORS"], totals);
    }
    Ok(())
}
