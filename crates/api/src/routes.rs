//! API route definitions

use crate::handlers;
use crate::SharedState;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::path::PathBuf;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
};

/// Create the main application router
pub fn create_router(state: SharedState, static_dir: Option<PathBuf>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/references",
            get(handlers::list_references).post(handlers::add_reference),
        )
        .route("/references/recent", get(handlers::recent_references))
        .route("/references/import", post(handlers::import_references))
        .route("/references/export", get(handlers::export_references))
        .route(
            "/references/{id}",
            put(handlers::edit_reference).delete(handlers::delete_reference),
        )
        .route("/models/known", get(handlers::known_models))
        .route("/report", post(handlers::build_report))
        .route("/report/export", post(handlers::export_report))
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(CompressionLayer::new());

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use biosaudit_database::{Database, JsonMirror, ReferenceStore};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn app() -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::in_memory().await.unwrap();
        let store = ReferenceStore::new(db, JsonMirror::new(dir.path().join("bios.json")));
        let state = Arc::new(AppState::new(store));
        (create_router(state, None), dir)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Body, json: bool) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        if json {
            request = request.header(header::CONTENT_TYPE, "application/json");
        }
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, Body::from(body.to_string()), true).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = app().await;
        let (status, body) = send(&app, Method::GET, "/api/v1/health", Body::empty(), false).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_reference_lifecycle() {
        let (app, _dir) = app().await;

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/api/v1/references",
            json!({"vendor": "Dell", "model": "Latitude 5420", "version": "1.20"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["model_name"], "Dell Latitude 5420");
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, _) = send_json(
            &app,
            Method::POST,
            "/api/v1/references",
            json!({"vendor": "Dell", "model": "Dell LATITUDE 5420", "version": "1.21"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send_json(
            &app,
            Method::PUT,
            &format!("/api/v1/references/{}", id),
            json!({"version": "1.22", "is_old": true}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["latest_version"], "1.22");
        assert_eq!(body["data"]["is_old"], true);

        let (status, body) = send(&app, Method::GET, "/api/v1/references/export", Body::empty(), false).await;
        assert_eq!(status, StatusCode::OK);
        let mirror: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(mirror, json!({"Dell Latitude 5420": "1.22"}));

        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/references/{}", id), Body::empty(), false).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/references/{}", id), Body::empty(), false).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_import_requires_object() {
        let (app, _dir) = app().await;

        let (status, _) = send_json(&app, Method::POST, "/api/v1/references/import", json!(["x"])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/api/v1/references/import",
            json!({"HP EliteBook 840 G8": "01.10", "Dell Latitude 7420": 1.3}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["updated"], 2);

        let (_, body) = send(&app, Method::GET, "/api/v1/references", Body::empty(), false).await;
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_report_and_export() {
        let (app, _dir) = app().await;
        send_json(
            &app,
            Method::POST,
            "/api/v1/references/import",
            json!({"Dell Latitude 5420": "1.20"}),
        )
        .await;

        let csv = "Hostname,Model,BIOS,Serial\nHR-PC-01,Latitude 5420,1.18,ABC\nHR-PC-02,Latitude 5420,1.20,DEF\n";

        let (status, body) = send(&app, Method::POST, "/api/v1/report", Body::from(csv), false).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["data"]["statistics"]["outdated"], 1);
        assert_eq!(body["data"]["statistics"]["risk"], "warning");
        assert_eq!(body["data"]["rows"][0]["classification"], "OUTDATED");

        let (status, body) = send(&app, Method::POST, "/api/v1/report/export", Body::from(csv), false).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("Name;Model;Tag;Ver PC;Ver Baza;Status"));
        assert!(text.contains("HR-PC-02;Latitude 5420;DEF;1.20;1.20;UP TO DATE"));
    }

    #[tokio::test]
    async fn test_malformed_report_is_rejected() {
        let (app, _dir) = app().await;
        let (status, body) = send(&app, Method::POST, "/api/v1/report", Body::from(""), false).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
    }
}
