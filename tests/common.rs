//! Shared helpers for the remindr integration tests
//!
//! Every test gets its own shared in-memory database, so tests run in
//! parallel without seeing each other's records.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use remindr::{
    config,
    db::init_pool,
    dto::CreateUserDto,
    models::User,
    repo::SqliteStore,
    resource::Store,
    AppContext,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const BASE_URL: &str = "http://localhost:3000";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// A running application plus direct access to its storage
pub struct TestApp {
    pub router: Router,
    pub store: SqliteStore,
}

/// Creates a test application with a fresh database and a fixed base URL
pub fn create_test_app() -> TestApp {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = Arc::new(init_pool(&database_url).unwrap());

    {
        let conn = &mut pool.get().unwrap();
        remindr::run_migrations(conn).unwrap();
    }

    let mut config = config::base_config(None);
    config.base_url = Some(BASE_URL.to_string());

    TestApp {
        router: remindr::create_app(AppContext::new(pool.clone(), &config)),
        store: SqliteStore::new(pool),
    }
}

/// Stores a user directly, bypassing the admin-only API
pub fn create_user(app: &TestApp, username: &str, roles: &[&str]) -> User {
    Store::<User>::create(
        &app.store,
        CreateUserDto {
            username: username.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        },
    )
    .unwrap()
}

/// Logs in through the API and returns the session token
pub async fn login(app: &TestApp, username: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Creates an admin account and returns its session token
pub async fn admin_token(app: &TestApp) -> String {
    create_user(app, "admin", &["admin"]);
    login(app, "admin").await
}

/// Sends a JSON request, optionally as the holder of `token`
///
/// ### Returns
///
/// The status and the JSON body, or `Value::Null` when the body is empty
pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = body.map(|json| json.to_string());
    dispatch(app, method, uri, token, body).await
}

/// Sends `body` verbatim with a JSON content type
pub async fn send_raw(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    dispatch(app, method, uri, token, Some(body.to_string())).await
}

async fn dispatch(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(text) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(text))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
