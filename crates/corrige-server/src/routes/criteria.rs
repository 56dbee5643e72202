use axum::extract::Query;
use axum::Json;
use corrige_core::criteria::{criteria_table, level_guidance, task_criteria};
use corrige_core::types::{Level, TaskType};

use crate::error::AppError;

#[derive(Debug, Default, serde::Deserialize)]
pub struct CriteriaQuery {
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    task: Option<String>,
}

/// GET /api/criteria — full table, or a single level/task when asked.
pub async fn get_criteria(
    Query(q): Query<CriteriaQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    if q.level.is_none() && q.task.is_none() {
        return Ok(Json(serde_json::to_value(criteria_table())?));
    }

    let mut out = serde_json::Map::new();
    if let Some(level) = q.level {
        let level: Level = level.parse()?;
        out.insert("level".into(), serde_json::to_value(level_guidance(level))?);
    }
    if let Some(task) = q.task {
        let task: TaskType = task.parse()?;
        out.insert(
            "task".into(),
            serde_json::json!({
                "task_type": task,
                "label": task.label(),
                "criteria": task_criteria(task),
            }),
        );
    }
    Ok(Json(serde_json::Value::Object(out)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn full_table_lists_every_level() {
        let json = get_criteria(Query(CriteriaQuery::default())).await.unwrap().0;
        assert_eq!(json["levels"].as_array().unwrap().len(), 6);
        assert_eq!(json["tasks"].as_array().unwrap().len(), TaskType::all().len());
    }

    #[tokio::test]
    async fn single_level_and_task() {
        let q = CriteriaQuery {
            level: Some("b2".into()),
            task: Some("carta".into()),
        };
        let json = get_criteria(Query(q)).await.unwrap().0;
        assert_eq!(json["level"]["min_words"], 150);
        assert_eq!(json["task"]["task_type"], "letter");
    }

    #[tokio::test]
    async fn unknown_level_is_an_error() {
        let q = CriteriaQuery {
            level: Some("Z9".into()),
            task: None,
        };
        assert!(get_criteria(Query(q)).await.is_err());
    }
}
