use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

/// Dashboard assets, compiled into the binary.
#[derive(Embed)]
#[folder = "../../frontend/"]
struct Dashboard;

fn asset(path: &str) -> Option<Response> {
    let file = <Dashboard as Embed>::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime.as_ref().to_string()),
                (header::CACHE_CONTROL, "no-cache".to_string()),
            ],
            file.data.into_owned(),
        )
            .into_response(),
    )
}

/// Fallback handler: embedded asset by path, JSON 404 for unknown API
/// routes, and the dashboard shell for everything else.
pub async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if path.starts_with("api/") {
        let body = serde_json::json!({ "error": format!("no route for /{path}") });
        return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
    }

    let path = if path.is_empty() { "index.html" } else { path };
    if let Some(resp) = asset(path) {
        return resp;
    }

    asset("index.html")
        .unwrap_or_else(|| (StatusCode::NOT_FOUND, "dashboard assets missing").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn root_serves_dashboard_html() {
        let resp = static_handler(Uri::from_static("/")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let ct = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(ct.starts_with("text/html"));
    }

    #[tokio::test]
    async fn script_gets_javascript_mime() {
        let resp = static_handler(Uri::from_static("/app.js")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let ct = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(ct.contains("javascript"));
    }

    #[tokio::test]
    async fn unknown_api_path_is_404() {
        let resp = static_handler(Uri::from_static("/api/nope")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn client_routes_fall_back_to_shell() {
        let resp = static_handler(Uri::from_static("/students/ana")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
