//! Router-level tests against an in-memory SQLite store.

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use quill_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, Paging, api_router};

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let mut state = AppState::new(store);
  state.paging = Paging { default_limit: 100, max_limit: 3 };
  api_router(state)
}

fn auth_header(user: &str, pass: &str) -> String {
  format!("Basic {}", B64.encode(format!("{user}:{pass}")))
}

async fn send(
  app:    &Router,
  method: &str,
  uri:    &str,
  auth:   Option<&str>,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(auth) = auth {
    builder = builder.header(header::AUTHORIZATION, auth);
  }
  let req = match body {
    Some(json) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

/// Register `name` with password `password123` and return its Basic header.
async fn register(app: &Router, name: &str) -> String {
  let (status, body) = send(
    app,
    "POST",
    "/auth/register",
    None,
    Some(json!({
      "email": format!("{name}@example.com"),
      "username": name,
      "password": "password123",
      "password2": "password123",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  auth_header(name, "password123")
}

async fn create_note(app: &Router, auth: &str, title: &str, content: &str) -> Value {
  let (status, body) = send(
    app,
    "POST",
    "/notes",
    Some(auth),
    Some(json!({ "title": title, "content": content })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body
}

// ── Accounts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_login() {
  let app = app().await;
  let (status, body) = send(
    &app,
    "POST",
    "/auth/register",
    None,
    Some(json!({
      "email": "alice@example.com",
      "username": "alice",
      "password": "password123",
      "password2": "password123",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["message"], "User registered successfully");
  assert_eq!(body["user"]["username"], "alice");
  assert!(body["user"].get("password_hash").is_none());

  let (status, body) = send(
    &app,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "username": "alice", "password": "password123" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Login successful");

  let (status, body) = send(
    &app,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "username": "alice", "password": "nope" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "Incorrect username or password");
}

#[tokio::test]
async fn registration_validation_errors() {
  let app = app().await;
  let (status, body) = send(
    &app,
    "POST",
    "/auth/register",
    None,
    Some(json!({
      "email": "alice@example.com",
      "username": "alice",
      "password": "password123",
      "password2": "password124",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["error"], "Passwords do not match");

  register(&app, "alice").await;
  let (status, body) = send(
    &app,
    "POST",
    "/auth/register",
    None,
    Some(json!({
      "email": "other@example.com",
      "username": "alice",
      "password": "password123",
      "password2": "password123",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].as_str().unwrap().contains("username"));
}

// ── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn notes_require_credentials() {
  let app = app().await;
  register(&app, "alice").await;

  let req = Request::builder().uri("/notes").body(Body::empty()).unwrap();
  let resp = app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

  let bad = auth_header("alice", "wrong");
  let (status, _) = send(&app, "GET", "/notes", Some(&bad), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Notes and versions ───────────────────────────────────────────────────────

#[tokio::test]
async fn notes_lifecycle() {
  let app = app().await;
  let auth = register(&app, "alice").await;

  let note = create_note(&app, &auth, "Test Note", "Initial Content").await;
  let id = note["note_id"].as_str().unwrap().to_owned();

  let (status, updated) = send(
    &app,
    "PUT",
    &format!("/notes/{id}"),
    Some(&auth),
    Some(json!({ "title": "Updated Title", "content": "Updated Content" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["title"], "Updated Title");

  let (status, versions) =
    send(&app, "GET", &format!("/notes/{id}/versions"), Some(&auth), None).await;
  assert_eq!(status, StatusCode::OK);
  let versions = versions.as_array().unwrap().clone();
  assert_eq!(versions.len(), 1);
  assert_eq!(versions[0]["version_number"], 1);
  assert_eq!(versions[0]["title"], "Test Note");
  let version_id = versions[0]["version_id"].as_str().unwrap().to_owned();

  let (status, version) = send(
    &app,
    "GET",
    &format!("/notes/{id}/versions/{version_id}"),
    Some(&auth),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(version["content"], "Initial Content");

  let (status, restored) = send(
    &app,
    "POST",
    &format!("/notes/{id}/versions/{version_id}/restore"),
    Some(&auth),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(restored["title"], "Test Note");
  assert_eq!(restored["content"], "Initial Content");

  let (_, current) = send(&app, "GET", &format!("/notes/{id}"), Some(&auth), None).await;
  assert_eq!(current["title"], "Test Note");

  let (_, versions) =
    send(&app, "GET", &format!("/notes/{id}/versions"), Some(&auth), None).await;
  let versions = versions.as_array().unwrap();
  assert_eq!(versions.len(), 2);
  assert_eq!(versions[0]["version_number"], 2);
  assert_eq!(versions[0]["title"], "Updated Title");

  let (status, body) = send(&app, "DELETE", &format!("/notes/{id}"), Some(&auth), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert_eq!(body, Value::Null);

  let (status, body) =
    send(&app, "GET", &format!("/notes/{id}/versions"), Some(&auth), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "Note not found");
}

#[tokio::test]
async fn foreign_and_missing_notes_look_the_same() {
  let app = app().await;
  let alice = register(&app, "alice").await;
  let mallory = register(&app, "mallory").await;

  let note = create_note(&app, &alice, "secret", "plans").await;
  let id = note["note_id"].as_str().unwrap().to_owned();
  let missing = Uuid::new_v4();

  for (method, suffix, body) in [
    ("GET", "", None),
    ("PUT", "", Some(json!({ "title": "x", "content": "y" }))),
    ("DELETE", "", None),
    ("GET", "/versions", None),
  ] {
    let foreign = send(&app, method, &format!("/notes/{id}{suffix}"), Some(&mallory), body.clone()).await;
    let absent = send(&app, method, &format!("/notes/{missing}{suffix}"), Some(&mallory), body).await;
    assert_eq!(foreign.0, StatusCode::NOT_FOUND, "{method} {suffix}");
    assert_eq!(foreign, absent, "{method} {suffix}");
  }

  // Still intact for its owner.
  let (status, still) = send(&app, "GET", &format!("/notes/{id}"), Some(&alice), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(still["title"], "secret");
}

#[tokio::test]
async fn version_of_another_note_is_not_found() {
  let app = app().await;
  let auth = register(&app, "alice").await;

  let a = create_note(&app, &auth, "a", "").await;
  let b = create_note(&app, &auth, "b", "").await;
  let a_id = a["note_id"].as_str().unwrap().to_owned();
  let b_id = b["note_id"].as_str().unwrap().to_owned();

  send(
    &app,
    "PUT",
    &format!("/notes/{b_id}"),
    Some(&auth),
    Some(json!({ "title": "b2", "content": "" })),
  )
  .await;
  let (_, versions) =
    send(&app, "GET", &format!("/notes/{b_id}/versions"), Some(&auth), None).await;
  let b_version = versions[0]["version_id"].as_str().unwrap().to_owned();

  let (status, body) = send(
    &app,
    "POST",
    &format!("/notes/{a_id}/versions/{b_version}/restore"),
    Some(&auth),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "Version not found");

  let (_, versions) =
    send(&app, "GET", &format!("/notes/{a_id}/versions"), Some(&auth), None).await;
  assert!(versions.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_requests_fail_validation() {
  let app = app().await;
  let auth = register(&app, "alice").await;

  let (status, body) = send(
    &app,
    "POST",
    "/notes",
    Some(&auth),
    Some(json!({ "title": "no content" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].as_str().unwrap().contains("content"));

  let req = Request::builder()
    .method("POST")
    .uri("/notes")
    .header(header::AUTHORIZATION, &auth)
    .header(header::CONTENT_TYPE, "text/plain")
    .body(Body::from(json!({ "title": "t", "content": "c" }).to_string()))
    .unwrap();
  let resp = app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

  let (status, _) = send(&app, "GET", "/notes/not-a-uuid", Some(&auth), None).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

  let (status, _) = send(&app, "GET", "/notes?limit=0", Some(&auth), None).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn list_is_paged_and_clamped() {
  let app = app().await;
  let alice = register(&app, "alice").await;
  let bob = register(&app, "bob").await;

  for i in 0..5 {
    create_note(&app, &alice, &format!("n{i}"), "").await;
  }
  create_note(&app, &bob, "bob's", "").await;

  // max_limit is 3 in these tests.
  let (_, page) = send(&app, "GET", "/notes?limit=50", Some(&alice), None).await;
  assert_eq!(page.as_array().unwrap().len(), 3);

  let (_, page) = send(&app, "GET", "/notes?skip=3&limit=3", Some(&alice), None).await;
  assert_eq!(page.as_array().unwrap().len(), 2);

  let (_, page) = send(&app, "GET", "/notes", Some(&bob), None).await;
  let page = page.as_array().unwrap();
  assert_eq!(page.len(), 1);
  assert_eq!(page[0]["title"], "bob's");
}
