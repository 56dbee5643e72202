//! Submission analysis: prompt the model, coerce its answer into a validated
//! correction record, and persist the result.

use corrige_core::config::Config;
use corrige_core::correction::{word_count, CorrectionRecord, RawCorrection};
use corrige_core::criteria::{length_check, level_guidance, task_criteria, LengthVerdict};
use corrige_core::submission::Submission;
use corrige_core::tracking::{self, TrackingRow};
use corrige_core::types::{Level, TaskType};
use corrige_core::{prompt, CorrigeError};
use llm_client::{request_structured, ChatProvider, LlmError, StructuredOptions};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Core(#[from] CorrigeError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Level and task type fall back to the configured defaults when `None`.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub student: String,
    pub text: String,
    pub level: Option<Level>,
    pub task_type: Option<TaskType>,
    pub title: Option<String>,
}

/// Analyse one text. Nothing is written to disk; see [`persist`].
pub async fn analyze(
    chat: &dyn ChatProvider,
    config: &Config,
    req: AnalysisRequest,
) -> Result<Submission, AnalysisError> {
    if req.student.trim().is_empty() {
        return Err(AnalysisError::InvalidInput("student name is required".into()));
    }
    if word_count(&req.text) == 0 {
        return Err(AnalysisError::InvalidInput("text is empty".into()));
    }

    let level = req.level.unwrap_or(config.defaults.level);
    let task = req.task_type.unwrap_or(config.defaults.task_type);
    let guidance = level_guidance(level);
    let words = word_count(&req.text);

    let verdict = length_check(level, words);
    if verdict != LengthVerdict::Within {
        tracing::info!(
            words,
            min = guidance.min_words,
            max = guidance.max_words,
            ?verdict,
            "text length outside level guidance"
        );
    }

    let system = prompt::system_prompt();
    let user = prompt::user_prompt(&req.text, level, task, &guidance, task_criteria(task));
    let opts = StructuredOptions {
        max_attempts: config.llm.max_attempts,
        temperature: Some(config.llm.temperature),
        json_mode: config.llm.json_mode,
        retry_suffix: prompt::retry_suffix,
    };

    let out = request_structured::<RawCorrection, CorrectionRecord, _>(
        chat,
        &system,
        &user,
        &opts,
        |raw| raw.into_record().map_err(|e| e.to_string()),
    )
    .await?;

    tracing::info!(
        student = %req.student.trim(),
        %level,
        %task,
        words,
        errors = out.value.total_errors(),
        attempts = out.attempts,
        "submission analysed"
    );

    Ok(Submission::new(
        req.student,
        req.title,
        level,
        task,
        req.text,
        out.value,
        chat.model(),
    ))
}

/// Store the submission and append its row to the tracking sheet.
pub fn persist(root: &Path, submission: &Submission) -> corrige_core::Result<TrackingRow> {
    submission.save(root)?;
    let row = submission.to_tracking_row();
    tracking::append(root, &row)?;
    Ok(row)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use corrige_core::types::ErrorCategory;
    use llm_client::testing::ScriptedProvider;

    pub(crate) const VALID: &str = r#"{
        "errors": {"grammar": [{"fragment": "soy cansado", "correction": "estoy cansado", "explanation": "estar"}]},
        "corrected_text": "Estoy cansado.",
        "contextual": {
            "coherence": {"score": 8, "comment": "bien"},
            "cohesion": {"score": 7, "comment": "bien"},
            "register": {"score": 6, "comment": "neutro"},
            "cultural_fit": {"score": 9, "comment": "bien"}
        },
        "advice": "Repasa ser y estar."
    }"#;

    fn request(text: &str) -> AnalysisRequest {
        AnalysisRequest {
            student: "Ana".into(),
            text: text.into(),
            level: Some(Level::A2),
            task_type: Some(TaskType::Email),
            title: None,
        }
    }

    #[tokio::test]
    async fn analyze_builds_submission() {
        let provider = ScriptedProvider::new([VALID]);
        let config = Config::new("t");
        let sub = analyze(&provider, &config, request("Soy cansado hoy."))
            .await
            .unwrap();
        assert_eq!(sub.student, "Ana");
        assert_eq!(sub.level, Level::A2);
        assert_eq!(sub.word_count, 3);
        assert_eq!(sub.model, "scripted");
        assert_eq!(sub.record.errors[&ErrorCategory::Grammar].len(), 1);

        let reqs = provider.requests();
        assert!(reqs[0].user.contains("Nivel del estudiante: A2"));
        assert!(reqs[0].user.contains("correo electrónico"));
        assert_eq!(reqs[0].temperature, Some(0.3));
    }

    #[tokio::test]
    async fn analyze_uses_config_defaults() {
        let provider = ScriptedProvider::new([VALID]);
        let mut config = Config::new("t");
        config.defaults.level = Level::C1;
        let mut req = request("Hola");
        req.level = None;
        req.task_type = None;
        let sub = analyze(&provider, &config, req).await.unwrap();
        assert_eq!(sub.level, Level::C1);
        assert_eq!(sub.task_type, TaskType::Essay);
        let user = &provider.requests()[0].user;
        assert!(user.contains("Nivel del estudiante: C1"));
        assert!(user.contains("180-220 palabras"));
    }

    #[tokio::test]
    async fn invalid_record_is_retried_with_spanish_hint() {
        let bad_score = VALID.replace("\"score\": 8", "\"score\": 80");
        let provider = ScriptedProvider::new([bad_score.as_str(), VALID]);
        let sub = analyze(&provider, &Config::new("t"), request("Soy cansado."))
            .await
            .unwrap();
        assert_eq!(sub.record.contextual.coherence.score, 8);
        let reqs = provider.requests();
        assert_eq!(reqs.len(), 2);
        assert!(reqs[1].user.contains("Tu respuesta anterior no era válida"));
        assert!(reqs[1].user.contains("coherence score 80"));
    }

    #[tokio::test]
    async fn exhausted_attempts_surface_as_llm_error() {
        let provider = ScriptedProvider::new(["no", "no", "no"]);
        let err = analyze(&provider, &Config::new("t"), request("Hola."))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Llm(LlmError::InvalidStructuredOutput { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn empty_input_is_rejected_before_calling_the_model() {
        let provider = ScriptedProvider::new([VALID]);
        let err = analyze(&provider, &Config::new("t"), request(" ... "))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));

        let mut req = request("Hola");
        req.student = "  ".into();
        assert!(analyze(&provider, &Config::new("t"), req).await.is_err());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn persist_writes_submission_and_row() {
        let dir = tempfile::TempDir::new().unwrap();
        let provider = ScriptedProvider::new([VALID]);
        let sub = analyze(&provider, &Config::new("t"), request("Soy cansado."))
            .await
            .unwrap();
        let row = persist(dir.path(), &sub).unwrap();
        assert_eq!(row.submission_id, sub.id);
        assert!(Submission::load(dir.path(), &sub.id).is_ok());
        assert_eq!(tracking::history(dir.path(), "ana").unwrap().len(), 1);
    }
}
