use axum::extract::State;
use axum::Json;
use corrige_core::config::Config;
use corrige_core::paths;

use crate::error::AppError;
use crate::routes::join_error;
use crate::state::AppState;

/// GET /api/config — effective configuration with validation warnings.
///
/// An uninitialized root reports defaults with `initialized: false` so the
/// dashboard can still render its form. The API key itself is never exposed.
pub async fn get_config(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let speech_available = app.speech.is_some();
    let result = tokio::task::spawn_blocking(move || {
        let initialized = paths::config_path(&root).exists();
        let config = Config::load_or_default(&root)?;
        Ok::<_, corrige_core::CorrigeError>(serde_json::json!({
            "initialized": initialized,
            "config": config,
            "warnings": config.validate(),
            "api_key_present": config.llm.api_key().is_some(),
            "speech_available": speech_available,
        }))
    })
    .await
    .map_err(join_error)??;

    Ok(Json(result))
}
