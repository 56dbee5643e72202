pub mod analysis;
pub mod embed;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::{AppState, Providers};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and by the integration tests.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Reference data
        .route("/api/config", get(routes::config::get_config))
        .route("/api/criteria", get(routes::criteria::get_criteria))
        // Submissions
        .route(
            "/api/submissions",
            get(routes::submissions::list_submissions).post(routes::submissions::create_submission),
        )
        .route(
            "/api/submissions/{id}",
            get(routes::submissions::get_submission),
        )
        .route(
            "/api/submissions/{id}/export",
            get(routes::submissions::export_submission),
        )
        .route(
            "/api/submissions/{id}/audio",
            get(routes::submissions::submission_audio),
        )
        // Students
        .route("/api/students", get(routes::students::list_students))
        .route(
            "/api/students/{student}/history",
            get(routes::students::student_history),
        )
        .route(
            "/api/students/{student}/progress",
            get(routes::students::student_progress),
        )
        .route(
            "/api/students/{student}/export",
            get(routes::students::export_student),
        )
        .fallback(embed::static_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the dashboard server on `port`.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the dashboard server on a pre-bound listener, so callers can read
/// the actual port first (e.g. after binding port 0).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(AppState::from_config(root)?);

    tracing::info!("corrige dashboard listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
