//! Integration tests for common Rampart workflows.
//!
//! These drive the demo application the way a browser would.

use rampart::demo;
use rampart::prelude::*;

fn app() -> Server {
    demo::app(CsrfConfig::default().with_secure(false)).unwrap()
}

fn cookie_pair(resp: &HttpResponse) -> String {
    let header = resp.header("set-cookie").expect("no Set-Cookie header");
    header.split(';').next().unwrap().to_string()
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_root_reports_protection() {
    let resp = app().dispatch(HttpRequest::new("GET", "/")).await;

    assert_eq!(resp.status, 200);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["message"], "Server is running with CSRF protection");
    assert!(resp.header("set-cookie").is_some());
}

#[test]
fn test_unknown_route_is_not_found() {
    let resp = tokio_test::block_on(app().dispatch(HttpRequest::new("GET", "/nope")));
    assert_eq!(resp.status, 404);
    assert!(cookie_pair(&resp).starts_with("_csrf_secret="));
}

#[tokio::test]
async fn test_handler_token_route_when_endpoint_disabled() {
    let server = demo::app(CsrfConfig::default().with_token_path(None)).unwrap();
    let resp = server.dispatch(HttpRequest::new("GET", "/csrf-token")).await;

    assert_eq!(resp.status, 200);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["csrfToken"].as_str().unwrap().len(), rampart::TOKEN_LEN);
}

// =============================================================================
// Browser flow
// =============================================================================

#[tokio::test]
async fn test_fetch_token_then_submit_form() {
    let app = app();

    let first = app.dispatch(HttpRequest::new("GET", "/csrf-token")).await;
    assert_eq!(first.status, 200);
    let cookie = cookie_pair(&first);
    assert!(!first.header("set-cookie").unwrap().contains("Secure"));

    let body: serde_json::Value = first.json().unwrap();
    let token = body["csrfToken"].as_str().unwrap().to_string();

    let resp = app
        .dispatch(
            HttpRequest::new("POST", "/submit")
                .with_header("Cookie", cookie)
                .with_header("Content-Type", "application/x-www-form-urlencoded")
                .with_body(format!("name=ada&_csrf={}", token)),
        )
        .await;

    assert_eq!(resp.status, 200);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body, serde_json::json!({ "received": { "name": "ada" } }));
}

#[tokio::test]
async fn test_json_submit_with_header_token() {
    let app = app();
    let first = app.dispatch(HttpRequest::new("GET", "/csrf-token")).await;
    let cookie = cookie_pair(&first);
    let body: serde_json::Value = first.json().unwrap();

    let resp = app
        .dispatch(
            HttpRequest::new("POST", "/submit")
                .with_header("Cookie", cookie)
                .with_header("Content-Type", "application/json")
                .with_header("X-CSRF-Token", body["csrfToken"].as_str().unwrap())
                .with_body(r#"{"count":3}"#),
        )
        .await;

    assert_eq!(resp.status, 200);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["received"]["count"], 3);
}

#[tokio::test]
async fn test_cross_site_post_is_rejected() {
    let resp = app()
        .dispatch(
            HttpRequest::new("POST", "/submit")
                .with_header("Content-Type", "application/x-www-form-urlencoded")
                .with_body("name=mallory"),
        )
        .await;

    assert_eq!(resp.status, 403);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Invalid CSRF token" }));
}

#[test]
fn test_invalid_config_fails_fast() {
    let result = demo::app(CsrfConfig::default().with_secret_size(16));
    assert!(matches!(result, Err(CsrfError::Config(_))));
}
