use crate::output::{print_json, print_table};
use corrige_core::criteria::{criteria_table, level_guidance, task_criteria};
use corrige_core::types::{Level, TaskType};

pub fn run(level: Option<Level>, task: Option<TaskType>, json: bool) -> anyhow::Result<()> {
    if json {
        if level.is_none() && task.is_none() {
            return print_json(&criteria_table());
        }
        return print_json(&serde_json::json!({
            "level": level.map(level_guidance),
            "task": task.map(|t| serde_json::json!({
                "task_type": t,
                "label": t.label(),
                "criteria": task_criteria(t),
            })),
        }));
    }

    let levels: Vec<Level> = match level {
        Some(l) => vec![l],
        None if task.is_none() => Level::all().to_vec(),
        None => Vec::new(),
    };
    if !levels.is_empty() {
        let rows = levels
            .iter()
            .map(|l| {
                let g = level_guidance(*l);
                vec![
                    g.level.to_string(),
                    format!("{}-{}", g.min_words, g.max_words),
                    format!("{} min", g.duration_minutes),
                    g.focus.to_string(),
                ]
            })
            .collect();
        print_table(&["LEVEL", "WORDS", "TIME", "FOCUS"], rows);
    }

    let tasks: Vec<TaskType> = match task {
        Some(t) => vec![t],
        None if level.is_none() => TaskType::all().to_vec(),
        None => Vec::new(),
    };
    for t in tasks {
        println!("\n{} ({})", t.label(), t.as_str());
        for c in task_criteria(t) {
            println!("  - {c}");
        }
    }
    Ok(())
}
