use crate::cmd::report;
use crate::output::{print_json, print_table};
use corrige_core::submission::{self, Submission};
use std::path::Path;

pub fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let sub = Submission::load(root, id)?;
    if json {
        print_json(&sub)?;
    } else {
        print!("{}", report::render(&sub));
    }
    Ok(())
}

pub fn list(root: &Path, student: Option<&str>, json: bool) -> anyhow::Result<()> {
    let subs = match student {
        Some(s) => submission::list_for_student(root, s)?,
        None => submission::list(root)?,
    };

    if json {
        let items: Vec<serde_json::Value> = subs
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": s.id,
                    "student": s.student,
                    "title": s.title,
                    "level": s.level,
                    "task_type": s.task_type,
                    "word_count": s.word_count,
                    "total_errors": s.record.total_errors(),
                    "created_at": s.created_at,
                })
            })
            .collect();
        return print_json(&items);
    }

    if subs.is_empty() {
        println!("No submissions yet.");
        return Ok(());
    }
    let rows = subs
        .iter()
        .map(|s| {
            vec![
                s.created_at.format("%Y-%m-%d %H:%M").to_string(),
                s.student.clone(),
                s.level.to_string(),
                s.task_type.as_str().to_string(),
                s.word_count.to_string(),
                s.record.total_errors().to_string(),
                s.id.clone(),
            ]
        })
        .collect();
    print_table(
        &["DATE", "STUDENT", "LEVEL", "TASK", "WORDS", "ERRORS", "ID"],
        rows,
    );
    Ok(())
}
