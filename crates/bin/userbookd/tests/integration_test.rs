//! End-to-end smoke tests for the full userbookd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real repo,
//! real service, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot` — no TCP port is bound.

use std::collections::HashSet;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use userbook_adapter_http_axum::router::{self, Mounts};
use userbook_adapter_http_axum::state::AppState;
use userbook_adapter_storage_sqlite_sqlx::{Config, SqliteUserRepository};
use userbook_app::services::user_service::UserService;
use userbook_domain::page::PageSize;

/// Build a fully-wired router backed by an in-memory `SQLite` database.
async fn app_with_page_size(page_size: usize) -> axum::Router {
    let db = Config::in_memory()
        .build()
        .await
        .expect("in-memory database should initialise");

    let repo = SqliteUserRepository::new(db.pool().clone());
    let state = AppState::new(UserService::new(repo), PageSize::new(page_size).unwrap());

    router::build(state, &Mounts::default())
}

async fn app() -> axum::Router {
    app_with_page_size(10).await
}

async fn call(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    };
    app.clone().oneshot(request.unwrap()).await.unwrap()
}

async fn post_form(app: &axum::Router, uri: &str, form: &'static str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn text(resp: Response) -> String {
    String::from_utf8(
        resp.into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec(),
    )
    .unwrap()
}

async fn json_body(resp: Response) -> Value {
    serde_json::from_slice(&resp.into_body().collect().await.unwrap().to_bytes()).unwrap()
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let resp = call(&app().await, "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "OK");
}

// ---------------------------------------------------------------------------
// JSON API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_complete_user_crud_cycle() {
    let app = app().await;

    // Create
    let resp = call(
        &app,
        "POST",
        "/api/users",
        Some(json!({"name": "Ada", "admin": true, "score": 1.5})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created = json_body(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    // Read back exactly what create returned
    let resp = call(&app, "GET", &format!("/api/users/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, created);

    // Replace
    let resp = call(
        &app,
        "PUT",
        &format!("/api/users/{id}"),
        Some(json!({"name": "Ada Lovelace"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await,
        json!({"id": id, "name": "Ada Lovelace"})
    );

    // Delete
    let resp = call(&app, "DELETE", &format!("/api/users/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Gone
    let resp = call(&app, "GET", &format!("/api/users/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Deleting twice is NotFound too
    let resp = call(&app, "DELETE", &format!("/api/users/{id}"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_visit_every_user_once_when_following_tokens() {
    let app = app_with_page_size(3).await;
    let mut created = HashSet::new();
    for i in 0..7 {
        let resp = call(&app, "POST", "/api/users", Some(json!({"n": i}))).await;
        created.insert(json_body(resp).await["id"].as_str().unwrap().to_string());
    }

    let mut seen = Vec::new();
    let mut calls = 0;
    let mut uri = "/api/users".to_string();
    loop {
        calls += 1;
        let page = json_body(call(&app, "GET", &uri, None).await).await;
        for item in page["items"].as_array().unwrap() {
            seen.push(item["id"].as_str().unwrap().to_string());
        }
        match page["nextPageToken"].as_str() {
            Some(token) => uri = format!("/api/users?pageToken={token}"),
            None => break,
        }
    }

    assert_eq!(calls, 3);
    assert_eq!(seen.len(), 7);
    assert_eq!(seen.iter().cloned().collect::<HashSet<_>>(), created);
}

#[tokio::test]
async fn should_return_empty_last_page_for_empty_store() {
    let page = json_body(call(&app().await, "GET", "/api/users", None).await).await;
    assert_eq!(page, json!({"items": [], "nextPageToken": null}));
}

#[tokio::test]
async fn should_reject_caller_assigned_id() {
    let app = app().await;
    let resp = call(
        &app,
        "POST",
        "/api/users",
        Some(json!({"id": "x", "title": "t"})),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error = json_body(resp).await;
    assert_eq!(error["internalCode"], "id_not_assignable");
    assert!(!error["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_nested_field_values() {
    let resp = call(
        &app().await,
        "POST",
        "/api/users",
        Some(json!({"address": {"city": "London"}})),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["internalCode"], "non_scalar_field");
}

#[tokio::test]
async fn should_leave_state_unchanged_when_updating_unknown_user() {
    let app = app().await;
    call(&app, "POST", "/api/users", Some(json!({"name": "Ada"}))).await;

    let resp = call(
        &app,
        "PUT",
        "/api/users/nonexistent-id",
        Some(json!({"name": "x"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let page = json_body(call(&app, "GET", "/api/users", None).await).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["items"][0]["name"], "Ada");
}

#[tokio::test]
async fn should_reject_update_claiming_another_id() {
    let app = app().await;
    let resp = call(&app, "POST", "/api/users", Some(json!({"name": "Ada"}))).await;
    let created = json_body(resp).await;
    let id = created["id"].as_str().unwrap();

    let resp = call(
        &app,
        "PUT",
        &format!("/api/users/{id}"),
        Some(json!({"id": "00000000-0000-4000-8000-000000000000", "name": "x"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["internalCode"], "id_mismatch");
}

// ---------------------------------------------------------------------------
// HTML pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_redirect_root_to_user_pages() {
    let resp = call(&app().await, "GET", "/", None).await;
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers()["location"], "/users");
}

#[tokio::test]
async fn should_render_empty_user_list() {
    let resp = call(&app().await, "GET", "/users", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(text(resp).await.contains("No users found"));
}

#[tokio::test]
async fn should_render_add_form() {
    let resp = call(&app().await, "GET", "/users/add", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = text(resp).await;
    assert!(body.contains("<form"));
    assert!(body.contains("_new_field_name"));
}

#[tokio::test]
async fn should_create_through_form_and_show_in_both_presentations() {
    let app = app().await;

    let resp = post_form(&app, "/users/add", "name=Grace&team=navy").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let target = resp.headers()["location"].to_str().unwrap().to_string();
    let id = target.strip_prefix("/users/").unwrap().to_string();

    let detail = text(call(&app, "GET", &target, None).await).await;
    assert!(detail.contains("Grace"));
    assert!(detail.contains("navy"));

    let user = json_body(call(&app, "GET", &format!("/api/users/{id}"), None).await).await;
    assert_eq!(user, json!({"id": id, "name": "Grace", "team": "navy"}));
}

#[tokio::test]
async fn should_flatten_errors_on_html_pages() {
    let resp = call(&app().await, "GET", "/users/nope/edit", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = text(resp).await;
    assert!(body.contains("not found"));
    assert!(!body.contains("internalCode"));
}
