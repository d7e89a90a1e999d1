use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use flate2::write::GzEncoder;
use flate2::Compression;
use pinhole_gateway::{App, AppState, SESSION_COOKIE};
use pinhole_shortener::InMemoryShortener;
use serde_json::{json, Value};
use tower::ServiceExt;

const BASE_URL: &str = "http://localhost:8080";

fn app() -> Router {
    let shortener = InMemoryShortener::in_memory(BASE_URL, None);
    App::router(AppState::new(Arc::new(shortener)))
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn issued_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_owned)
}

/// Opens a session by hitting `/ping` and returns its `Cookie` header value.
async fn session(app: &Router) -> String {
    let response = send(app, Request::get("/ping").body(Body::empty()).unwrap()).await;
    issued_cookie(&response).expect("session cookie issued")
}

fn post_text(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn json_request(method: &str, uri: &str, cookie: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// Polls `uri` until the background delete has tombstoned it.
async fn wait_until_gone(app: &Router, uri: &str, cookie: &str) {
    let mut status = StatusCode::TEMPORARY_REDIRECT;
    for _ in 0..50 {
        status = send(app, get(uri, cookie)).await.status();
        if status == StatusCode::GONE {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(status, StatusCode::GONE);
}

#[tokio::test]
async fn new_sessions_get_a_cookie_once() {
    let app = app();

    let cookie = session(&app).await;
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")));

    let response = send(&app, get("/ping", &cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(issued_cookie(&response).is_none());
}

#[tokio::test]
async fn shorten_text_then_redirect() {
    let app = app();
    let cookie = session(&app).await;

    let response = send(&app, post_text("/", &cookie, "http://example.com/a")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_text(response).await, "http://localhost:8080/1");

    let response = send(&app, get("/1", &cookie)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://example.com/a"
    );
}

#[tokio::test]
async fn shortening_twice_conflicts_with_same_url() {
    let app = app();
    let cookie = session(&app).await;

    let first = send(&app, post_text("/", &cookie, "http://example.com/a")).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_text(first).await;

    let second = send(&app, post_text("/", &cookie, "http://example.com/a")).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_text(second).await, first);
}

#[tokio::test]
async fn empty_body_is_rejected() {
    let app = app();
    let cookie = session(&app).await;

    let response = send(&app, post_text("/", &cookie, "")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gzip_bodies_are_decompressed() {
    let app = app();
    let cookie = session(&app).await;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"http://example.com/gzip").unwrap();
    let compressed = encoder.finish().unwrap();

    let request = Request::post("/")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_ENCODING, "gzip")
        .body(Body::from(compressed))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, get("/1", &cookie)).await;
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://example.com/gzip"
    );
}

#[tokio::test]
async fn redirect_of_unknown_or_foreign_id_is_bad_request() {
    let app = app();
    let alice = session(&app).await;
    let bob = session(&app).await;

    send(&app, post_text("/", &alice, "http://example.com/a")).await;

    assert_eq!(
        send(&app, get("/99", &alice)).await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        send(&app, get("/1", &bob)).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn shorten_json_endpoint() {
    let app = app();
    let cookie = session(&app).await;
    let body = json!({ "url": "http://example.com/json" });

    let response = send(&app, json_request("POST", "/api/shorten", &cookie, body.clone())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!({ "result": "http://localhost:8080/1" })
    );

    let response = send(&app, json_request("POST", "/api/shorten", &cookie, body)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await,
        json!({ "result": "http://localhost:8080/1" })
    );
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let app = app();
    let cookie = session(&app).await;

    let request = Request::post("/api/shorten")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"url\":"))
        .unwrap();
    let response = send(&app, request).await;

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn batch_reports_new_urls_with_correlation_ids() {
    let app = app();
    let cookie = session(&app).await;
    send(&app, post_text("/", &cookie, "http://example.com/old")).await;

    let body = json!([
        { "correlation_id": "a", "original_url": "http://example.com/new-a" },
        { "correlation_id": "b", "original_url": "http://example.com/old" },
        { "correlation_id": "c", "original_url": "http://example.com/new-c" },
    ]);
    let response = send(&app, json_request("POST", "/api/shorten/batch", &cookie, body)).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!([
            { "correlation_id": "a", "short_url": "http://localhost:8080/2" },
            { "correlation_id": "c", "short_url": "http://localhost:8080/3" },
        ])
    );
}

#[tokio::test]
async fn user_urls_lists_only_the_session_archive() {
    let app = app();
    let alice = session(&app).await;
    let bob = session(&app).await;

    let response = send(&app, get("/api/user/urls", &alice)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    send(&app, post_text("/", &alice, "http://example.com/a")).await;
    send(&app, post_text("/", &bob, "http://example.com/b")).await;
    send(&app, post_text("/", &alice, "http://example.com/c")).await;

    let response = send(&app, get("/api/user/urls", &alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([
            { "short_url": "http://localhost:8080/1", "original_url": "http://example.com/a" },
            { "short_url": "http://localhost:8080/3", "original_url": "http://example.com/c" },
        ])
    );
}

#[tokio::test]
async fn delete_is_accepted_and_applied_in_background() {
    let app = app();
    let cookie = session(&app).await;
    send(&app, post_text("/", &cookie, "http://example.com/a")).await;
    send(&app, post_text("/", &cookie, "http://example.com/b")).await;

    let response = send(
        &app,
        json_request("DELETE", "/api/user/urls", &cookie, json!(["1"])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    wait_until_gone(&app, "/1", &cookie).await;

    let response = send(&app, get("/2", &cookie)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let response = send(&app, get("/api/user/urls", &cookie)).await;
    assert_eq!(
        body_json(response).await,
        json!([{ "short_url": "http://localhost:8080/2", "original_url": "http://example.com/b" }])
    );
}

#[tokio::test]
async fn user_urls_is_empty_after_deleting_everything() {
    let app = app();
    let cookie = session(&app).await;
    send(&app, post_text("/", &cookie, "http://example.com/a")).await;

    let response = send(
        &app,
        json_request("DELETE", "/api/user/urls", &cookie, json!(["1"])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    wait_until_gone(&app, "/1", &cookie).await;

    let response = send(&app, get("/api/user/urls", &cookie)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn ping_reports_healthy_storage() {
    let app = app();

    let response = send(&app, Request::get("/ping").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
}
