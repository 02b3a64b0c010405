use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use siem_snapshot_api::{create_app, create_router, AppState, Config, FileStorage, RetrievalService};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const LOGINS: &str = r#"[{"id":1,"user":"alice","time":"2024-01-01T00:00:00Z"}]"#;

/// Data directory with every category except `devices`, and a malformed `reports`
fn data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "logins.json", LOGINS);
    write(
        dir.path(),
        "locations.json",
        r#"{"hq":{"lat":52.52,"lon":13.405},"branches":[]}"#,
    );
    write(
        dir.path(),
        "compromised.json",
        r#"[{"host":"cam-03","indicator":"mirai","severity":"high"}]"#,
    );
    write(dir.path(), "suricata_rules.json", r#"{"rules":[],"map":{}}"#);
    write(dir.path(), "reports.json", r#"[{"title": "weekly", "#);
    dir
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn app_for(dir: &Path) -> Router {
    let service = RetrievalService::new(Arc::new(FileStorage::new(dir)));
    create_router(AppState::new(service))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn logins_snapshot_is_served_verbatim() {
    let dir = data_dir();
    let app = app_for(dir.path());

    let (status, body) = get(&app, "/api/logins").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::from_str::<Value>(LOGINS).unwrap());
}

#[tokio::test]
async fn every_stored_category_returns_its_document() {
    let dir = data_dir();
    let app = app_for(dir.path());

    for (path, file) in [
        ("/api/logins", "logins.json"),
        ("/api/locations", "locations.json"),
        ("/api/compromised", "compromised.json"),
        ("/api/suricata_rules", "suricata_rules.json"),
    ] {
        let expected: Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(file)).unwrap()).unwrap();
        let (status, body) = get(&app, path).await;
        assert_eq!(status, StatusCode::OK, "path {} should return 200", path);
        assert_eq!(body, expected, "path {} body mismatch", path);
    }
}

#[tokio::test]
async fn object_key_order_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "reports.json", r#"{"zeta":1,"alpha":2,"mid":3}"#);
    let app = app_for(dir.path());

    let request = Request::builder()
        .uri("/api/reports")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], br#"{"zeta":1,"alpha":2,"mid":3}"#);
}

#[tokio::test]
async fn unknown_categories_return_invalid_endpoint() {
    let dir = data_dir();
    // A file for an unknown name must never be served
    write(dir.path(), "unknown.json", "[]");
    let app = app_for(dir.path());

    for path in [
        "/api/unknown",
        "/api/Logins",
        "/api/LOGINS",
        "/api/login",
        "/api/logins.json",
        "/api/suricata-rules",
        "/api/",
        "/api",
        "/api/logins/extra",
        "/does/not/exist",
    ] {
        let (status, body) = get(&app, path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "path {} should return 404", path);
        assert_eq!(body, json!({ "error": "Invalid endpoint" }), "path {}", path);
    }
}

#[tokio::test]
async fn trailing_slash_is_accepted() {
    let dir = data_dir();
    let app = app_for(dir.path());

    let (status, body) = get(&app, "/api/logins/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::from_str::<Value>(LOGINS).unwrap());

    let (status, body) = get(&app, "/api/devices/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to load devices.json" }));

    let (status, body) = get(&app, "/api/Logins/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Invalid endpoint" }));
}

#[tokio::test]
async fn non_get_methods_return_invalid_endpoint() {
    let dir = data_dir();
    let app = app_for(dir.path());

    for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
        let request = Request::builder()
            .method(method.clone())
            .uri("/api/logins")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "method {}", method);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Invalid endpoint" }), "method {}", method);
    }
}

#[tokio::test]
async fn missing_resource_returns_load_failure() {
    let dir = data_dir();
    let app = app_for(dir.path());

    let (status, body) = get(&app, "/api/devices").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to load devices.json" }));
}

#[tokio::test]
async fn malformed_resource_returns_load_failure() {
    let dir = data_dir();
    let app = app_for(dir.path());

    let (status, body) = get(&app, "/api/reports").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to load reports.json" }));
}

#[tokio::test]
async fn repeated_requests_are_identical() {
    let dir = data_dir();
    let app = app_for(dir.path());

    for path in ["/api/locations", "/api/devices", "/api/nope"] {
        let first = get(&app, path).await;
        let second = get(&app, path).await;
        assert_eq!(first, second, "path {}", path);
    }
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let dir = data_dir();
    let app = app_for(dir.path());

    let ((logins_status, logins), (locations_status, locations), (devices_status, _)) = tokio::join!(
        get(&app, "/api/logins"),
        get(&app, "/api/locations"),
        get(&app, "/api/devices"),
    );

    assert_eq!(logins_status, StatusCode::OK);
    assert_eq!(logins[0]["user"], "alice");
    assert_eq!(locations_status, StatusCode::OK);
    assert_eq!(locations["hq"]["lat"], 52.52);
    // one failing request does not affect the others
    assert_eq!(devices_status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn updated_resource_is_picked_up_without_restart() {
    let dir = data_dir();
    let app = app_for(dir.path());

    let (status, _) = get(&app, "/api/devices").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    write(dir.path(), "devices.json", r#"[{"id":"cam-03","type":"camera"}]"#);

    let (status, body) = get(&app, "/api/devices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": "cam-03", "type": "camera" }]));
}

#[tokio::test]
async fn health_lists_categories() {
    let dir = data_dir();
    let app = app_for(dir.path());

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(
        body["categories"],
        json!(["logins", "devices", "locations", "compromised", "suricata_rules", "reports"])
    );
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let dir = data_dir();
    let service = RetrievalService::new(Arc::new(FileStorage::new(dir.path())));
    let app = create_app(AppState::new(service), &Config::default()).unwrap();

    let request = Request::builder()
        .uri("/api/logins")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn cors_preflight_from_configured_origin() {
    let dir = data_dir();
    let mut config = Config::default();
    config.server.cors_origins = vec!["http://dashboard.local:3000".to_string()];

    let service = RetrievalService::new(Arc::new(FileStorage::new(dir.path())));
    let app = create_app(AppState::new(service), &config).unwrap();

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/logins")
        .header(header::ORIGIN, "http://dashboard.local:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(preflight).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://dashboard.local:3000"
    );

    let foreign = Request::builder()
        .uri("/api/logins")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(foreign).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
