use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use rosterd::config::Config;
use rosterd::db::Storage;
use rosterd::server::{AppState, app_router};
use rosterd::service::password;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn test_app(configure: impl FnOnce(&mut Config)) -> (Router, Storage, Arc<Config>, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::default();
    config.database_file = dir.path().join("app.sqlite");
    config.upload.dir = dir.path().join("uploads");
    configure(&mut config);
    let config = Arc::new(config);

    let storage = Storage::connect(&config.database())
        .await
        .expect("connect storage");
    storage.init_schema().await.expect("init schema");

    let state = AppState::new(storage.clone(), config.clone());
    let app = app_router(state).expect("build router");
    (app, storage, config, dir)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

#[tokio::test]
async fn bulk_create_inserts_users_and_sections() {
    let (app, storage, _config, _dir) = test_app(|_| {}).await;

    let payload = json!([
        {"uid": "legacy1", "name": "Legacy One", "sections": ["CSA"]},
        {"uid": "legacy2", "name": "Legacy Two"}
    ]);
    let resp = app
        .oneshot(post_json("/api/users", payload))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body_str = std::str::from_utf8(&body).expect("body utf-8");
    assert!(body_str.contains(r#""created":2"#));

    assert_eq!(storage.count_users().await.expect("count"), 2);
    let user = storage
        .user_by_uid("legacy1")
        .await
        .expect("query")
        .expect("legacy1 exists");
    assert_eq!(user.name, "Legacy One");

    let sections = storage.list_sections().await.expect("sections");
    assert!(sections.iter().any(|s| s.abbreviation == "CSA"));
}

#[tokio::test]
async fn bulk_create_rejects_record_without_uid() {
    let (app, storage, _config, _dir) = test_app(|_| {}).await;

    let resp = app
        .oneshot(post_json("/api/users", json!([{"name": "no uid"}])))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(storage.count_users().await.expect("count"), 0);
}

#[tokio::test]
async fn bulk_create_rejects_scalar_payload() {
    let (app, _storage, _config, _dir) = test_app(|_| {}).await;

    let resp = app
        .oneshot(post_json("/api/users", json!("nope")))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (app, _storage, _config, _dir) = test_app(|config| {
        config.upload.max_content_length = 1024;
    })
    .await;

    let oversized = "a".repeat(4 * 1024);
    let resp = app
        .oneshot(post_json("/api/users", json!([{"uid": oversized}])))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn authenticate_issues_session_for_gated_routes() {
    let (app, storage, config, _dir) = test_app(|_| {}).await;

    let hash = password::hash("letmein").expect("hash");
    storage
        .upsert_user("jdoe", "Jane Doe", &hash)
        .await
        .expect("seed user");

    // Without a session the listing is refused.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Wrong password is refused.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/authenticate",
            json!({"uid": "jdoe", "password": "wrong"}),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Correct credentials set the session cookie.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/authenticate",
            json!({"uid": "jdoe", "password": "letmein"}),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .expect("cookie ascii")
        .to_string();
    assert!(set_cookie.starts_with(&config.token_name));

    // The cookie unlocks the gated routes.
    let cookie_pair = set_cookie.split(';').next().expect("cookie pair");
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header(header::COOKIE, cookie_pair)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/user")
                .header(header::COOKIE, cookie_pair)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body_str = std::str::from_utf8(&body).expect("body utf-8");
    assert!(body_str.contains(r#""uid":"jdoe""#));
}
