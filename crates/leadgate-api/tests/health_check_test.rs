//! Health, configuration diagnostics, and landing-page tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use leadgate_api::{create_router, AppState, Config};
use leadgate_testing::TestEnv;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with_config(env: &TestEnv, config: Config) -> Router {
    create_router(AppState::new(config, Arc::new(env.pipeline())))
}

async fn get(app: Router, path: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().method("GET").uri(path).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.expect("request should complete");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    (status, bytes.to_vec())
}

#[tokio::test]
async fn health_returns_ok() {
    let env = TestEnv::new().await;

    let (status, body) = get(app_with_config(&env, Config::default()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"status": "ok"}));
}

#[tokio::test]
async fn debug_env_reports_all_missing_by_default() {
    let env = TestEnv::new().await;

    let (status, body) = get(app_with_config(&env, Config::default()), "/debug/env").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap(),
        json!({
            "GOOGLE_SHEETS_ID": "MISSING",
            "GOOGLE_PROJECT_ID": "MISSING",
            "GOOGLE_CLIENT_EMAIL": "MISSING",
            "GOOGLE_PRIVATE_KEY": "MISSING",
            "TRACKDRIVE_API_KEY": "MISSING",
        })
    );
}

#[tokio::test]
async fn debug_env_reports_present_values() {
    let env = TestEnv::new().await;

    let mut config = Config::default();
    config.google_sheets_id = "1abc".to_string();
    config.trackdrive_api_key = "key".to_string();

    let (_, body) = get(app_with_config(&env, config), "/debug/env").await;
    let status: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status["GOOGLE_SHEETS_ID"], json!("OK"));
    assert_eq!(status["TRACKDRIVE_API_KEY"], json!("OK"));
    assert_eq!(status["GOOGLE_PRIVATE_KEY"], json!("MISSING"));
}

#[tokio::test]
async fn landing_page_served_when_file_exists() {
    let env = TestEnv::new().await;

    let path = std::env::temp_dir().join("leadgate-landing-test.html");
    std::fs::write(&path, "<html><body>lead form</body></html>").unwrap();

    let mut config = Config::default();
    config.landing_page = path.to_string_lossy().into_owned();

    let (status, body) = get(app_with_config(&env, config), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("lead form"));

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn landing_page_missing_is_not_found() {
    let env = TestEnv::new().await;

    let mut config = Config::default();
    config.landing_page = "/nonexistent/landing.html".to_string();

    let (status, _) = get(app_with_config(&env, config), "/").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
