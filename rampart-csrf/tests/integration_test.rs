//! Integration tests for rampart-csrf

use rampart_csrf::*;
use rampart_http::{Error, HttpRequest, HttpResponse, MiddlewareChain, Server, handler};
use std::sync::Arc;

const SECRET: &str = "deadbeefdeadbeefdeadbeefdeadbeef";

fn app(config: CsrfConfig) -> Server {
    server(CsrfMiddleware::new(config).unwrap())
}

fn server(csrf: CsrfMiddleware) -> Server {
    let mut chain = MiddlewareChain::new();
    chain.use_middleware(csrf);

    Server::new(
        chain,
        handler(|req| async move {
            match (req.method.as_str(), req.path.as_str()) {
                ("GET", "/form") => {
                    let token = req.extensions.get::<CsrfToken>().cloned();
                    HttpResponse::ok().with_json(&serde_json::json!({
                        "token": token.map(|t| t.0),
                    }))
                }
                (_, "/submit") | (_, "/webhooks/stripe") | (_, "/api") | (_, "/api/users") => {
                    HttpResponse::ok().with_json(&serde_json::json!({ "ok": true }))
                }
                ("GET", "/login") => {
                    Ok(HttpResponse::ok().with_header("Set-Cookie", "session=abc; HttpOnly"))
                }
                ("GET", "/missing") => Err(Error::NotFound(req.path.clone())),
                _ => Ok(HttpResponse::not_found()),
            }
        }),
    )
}

/// `name=value` part of a `Set-Cookie` header
fn cookie_pair(resp: &HttpResponse) -> String {
    let header = resp.header("set-cookie").expect("no Set-Cookie header");
    header.split(';').next().unwrap().to_string()
}

fn token_of(resp: &HttpResponse) -> String {
    let body: serde_json::Value = resp.json().unwrap();
    body["csrfToken"].as_str().unwrap().to_string()
}

fn secret_cookie() -> String {
    format!("_csrf_secret={}", SECRET)
}

fn assert_rejected(resp: &HttpResponse) {
    assert_eq!(resp.status, 403);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Invalid CSRF token" }));
}

#[test]
fn test_scenario_a_b_codec() {
    let codec = TokenCodec::new(Arc::new(OsRandom));
    let secret = Secret::parse(SECRET).unwrap();

    let token = codec.issue(&secret).unwrap();
    assert!(codec.verify(&secret, &token));

    let mut tampered = token[..token.len() - 1].to_string();
    tampered.push(if token.ends_with('x') { 'y' } else { 'x' });
    assert!(!codec.verify(&secret, &tampered));
}

#[tokio::test]
async fn test_scenario_c_first_visit_gets_cookie_and_token() {
    let resp = app(CsrfConfig::default())
        .dispatch(HttpRequest::new("GET", "/csrf-token"))
        .await;

    assert_eq!(resp.status, 200);
    assert!(!token_of(&resp).is_empty());

    let set_cookie = resp.header("set-cookie").unwrap();
    assert!(set_cookie.starts_with("_csrf_secret="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Max-Age=3600"));
}

#[tokio::test]
async fn test_scenario_d_valid_header_token_proceeds() {
    let app = app(CsrfConfig::default());
    let first = app.dispatch(HttpRequest::new("GET", "/csrf-token")).await;
    let cookie = cookie_pair(&first);
    let token = token_of(&first);

    let resp = app
        .dispatch(
            HttpRequest::new("POST", "/submit")
                .with_header("Cookie", cookie)
                .with_header("x-csrf-token", token),
        )
        .await;

    assert_eq!(resp.status, 200);
    assert!(resp.header("set-cookie").is_none());
}

#[tokio::test]
async fn test_scenario_e_missing_token_is_rejected() {
    let resp = app(CsrfConfig::default())
        .dispatch(HttpRequest::new("DELETE", "/submit").with_header("Cookie", secret_cookie()))
        .await;

    assert_rejected(&resp);
}

#[tokio::test]
async fn test_all_channels_accepted() {
    let app = app(CsrfConfig::default());
    let token = token_of(
        &app.dispatch(HttpRequest::new("GET", "/csrf-token").with_header("Cookie", secret_cookie()))
            .await,
    );

    let requests = vec![
        HttpRequest::new("POST", "/submit").with_body(format!(r#"{{"_csrf":"{}"}}"#, token)),
        HttpRequest::new("POST", "/submit").with_body(format!("name=x&_csrf={}", token)),
        HttpRequest::new("PUT", "/submit").with_header("X-CSRF-Token", token.as_str()),
        HttpRequest::new("PATCH", "/submit").with_header("csrf-token", token.as_str()),
    ];

    for req in requests {
        let resp = app.dispatch(req.with_header("Cookie", secret_cookie())).await;
        assert_eq!(resp.status, 200);
    }
}

#[tokio::test]
async fn test_tokens_are_reusable() {
    let app = app(CsrfConfig::default());
    let token = token_of(
        &app.dispatch(HttpRequest::new("GET", "/csrf-token").with_header("Cookie", secret_cookie()))
            .await,
    );

    for _ in 0..3 {
        let resp = app
            .dispatch(
                HttpRequest::new("POST", "/submit")
                    .with_header("Cookie", secret_cookie())
                    .with_header("x-csrf-token", token.as_str()),
            )
            .await;
        assert_eq!(resp.status, 200);
    }
}

#[tokio::test]
async fn test_tampering_any_position_is_rejected() {
    let app = app(CsrfConfig::default());
    let token = token_of(
        &app.dispatch(HttpRequest::new("GET", "/csrf-token").with_header("Cookie", secret_cookie()))
            .await,
    );

    for i in 0..token.len() {
        let mut bytes = token.clone().into_bytes();
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        let resp = app
            .dispatch(
                HttpRequest::new("POST", "/submit")
                    .with_header("Cookie", secret_cookie())
                    .with_header("x-csrf-token", tampered),
            )
            .await;
        assert_rejected(&resp);
    }
}

#[tokio::test]
async fn test_token_from_other_session_is_rejected() {
    let app = app(CsrfConfig::default());
    let foreign = token_of(&app.dispatch(HttpRequest::new("GET", "/csrf-token")).await);

    let resp = app
        .dispatch(
            HttpRequest::new("POST", "/submit")
                .with_header("Cookie", secret_cookie())
                .with_header("x-csrf-token", foreign),
        )
        .await;
    assert_rejected(&resp);
}

#[tokio::test]
async fn test_unsafe_without_cookie_is_rejected() {
    let resp = app(CsrfConfig::default())
        .dispatch(HttpRequest::new("POST", "/submit").with_header("x-csrf-token", "abc"))
        .await;
    assert_rejected(&resp);
    assert!(cookie_pair(&resp).starts_with("_csrf_secret="));
}

#[tokio::test]
async fn test_rejection_with_cookie_sets_nothing() {
    let resp = app(CsrfConfig::default())
        .dispatch(HttpRequest::new("PUT", "/submit").with_header("Cookie", secret_cookie()))
        .await;
    assert_rejected(&resp);
    assert!(resp.header("set-cookie").is_none());
}

#[tokio::test]
async fn test_first_visit_error_page_sets_cookie() {
    let resp = app(CsrfConfig::default())
        .dispatch(HttpRequest::new("GET", "/missing"))
        .await;

    assert_eq!(resp.status, 404);
    assert!(cookie_pair(&resp).starts_with("_csrf_secret="));
}

#[tokio::test]
async fn test_handler_cookies_survive_minting() {
    let resp = app(CsrfConfig::default())
        .dispatch(HttpRequest::new("GET", "/login"))
        .await;

    assert_eq!(resp.status, 200);
    let cookies: Vec<_> = resp.header_values("set-cookie").collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.contains(&"session=abc; HttpOnly"));
    assert!(cookies.iter().any(|c| c.starts_with("_csrf_secret=")));
}

#[tokio::test]
async fn test_repeated_token_header_is_rejected() {
    let app = app(CsrfConfig::default());
    let token = token_of(
        &app.dispatch(HttpRequest::new("GET", "/csrf-token").with_header("Cookie", secret_cookie()))
            .await,
    );

    let mut req = HttpRequest::new("POST", "/submit").with_header("Cookie", secret_cookie());
    req.append_header("x-csrf-token", "garbage");
    req.append_header("X-CSRF-Token", &token);
    assert_rejected(&app.dispatch(req).await);

    let mut req = HttpRequest::new("POST", "/submit").with_header("Cookie", secret_cookie());
    req.append_header("x-csrf-token", &token);
    req.append_header("x-csrf-token", &token);
    assert_rejected(&app.dispatch(req).await);
}

#[tokio::test]
async fn test_safe_methods_are_exempt() {
    let default_app = app(CsrfConfig::default());
    for method in ["GET", "HEAD", "OPTIONS", "get"] {
        let resp = default_app.dispatch(HttpRequest::new(method, "/submit")).await;
        assert_eq!(resp.status, 200, "{method}");
    }

    for method in ["GET", "HEAD", "OPTIONS"] {
        let resp = default_app
            .dispatch(
                HttpRequest::new(method, "/submit")
                    .with_header("Cookie", secret_cookie())
                    .with_header("x-csrf-token", "not-a-token")
                    .with_header("Content-Type", "application/x-www-form-urlencoded")
                    .with_body(b"_csrf=garbage".to_vec()),
            )
            .await;
        assert_eq!(resp.status, 200, "{method} with a bad token");
    }

    let custom = app(CsrfConfig::default().with_ignored_methods(["GET"]));
    let resp = custom.dispatch(HttpRequest::new("OPTIONS", "/submit")).await;
    assert_eq!(resp.status, 403);
}

#[tokio::test]
async fn test_cookie_only_set_once() {
    let app = app(CsrfConfig::default());
    let first = app.dispatch(HttpRequest::new("GET", "/form")).await;
    let cookie = cookie_pair(&first);

    let second = app
        .dispatch(HttpRequest::new("GET", "/form").with_header("Cookie", cookie))
        .await;

    assert_eq!(second.status, 200);
    assert!(second.header("set-cookie").is_none());
    let body: serde_json::Value = second.json().unwrap();
    assert_eq!(body["token"].as_str().unwrap().len(), TOKEN_LEN);
}

#[tokio::test]
async fn test_malformed_cookie_is_replaced() {
    let resp = app(CsrfConfig::default())
        .dispatch(HttpRequest::new("GET", "/form").with_header("Cookie", "_csrf_secret=tooshort"))
        .await;

    assert_eq!(resp.status, 200);
    assert_ne!(cookie_pair(&resp), "_csrf_secret=tooshort");
}

#[tokio::test]
async fn test_excluded_paths_bypass_protection() {
    let app = app(CsrfConfig::default().with_exclude_paths(["/webhooks/"]));

    let resp = app.dispatch(HttpRequest::new("POST", "/webhooks/stripe")).await;
    assert_eq!(resp.status, 200);
    assert!(resp.header("set-cookie").is_none());

    let resp = app.dispatch(HttpRequest::new("POST", "/submit")).await;
    assert_eq!(resp.status, 403);
}

#[tokio::test]
async fn test_excluded_prefix_matches_segments() {
    let app = app(CsrfConfig::default().with_exclude_paths(["/api"]));

    for path in ["/api", "/api/users"] {
        let resp = app.dispatch(HttpRequest::new("POST", path)).await;
        assert_eq!(resp.status, 200, "{path}");
    }

    let resp = app.dispatch(HttpRequest::new("POST", "/apiary")).await;
    assert_rejected(&resp);
}

#[tokio::test]
async fn test_mint_on_unsafe_disabled() {
    let guard = CsrfGuard::new(CsrfConfig::default().with_mint_on_unsafe(false)).unwrap();
    let err = guard
        .evaluate(&HttpRequest::new("POST", "/submit"))
        .unwrap_err();
    assert_eq!(err.signal(), Some(ErrorSignal::MissingSecret));

    let resp = server(CsrfMiddleware::from_guard(guard))
        .dispatch(HttpRequest::new("POST", "/submit"))
        .await;
    assert_rejected(&resp);
}

struct NoEntropy;

impl RandomSource for NoEntropy {
    fn fill(&self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        Err(rand::Error::new(std::io::Error::other("entropy pool unavailable")))
    }
}

#[tokio::test]
async fn test_entropy_failure_is_internal_error() {
    let guard = CsrfGuard::with_random(CsrfConfig::default(), Arc::new(NoEntropy)).unwrap();
    let resp = server(CsrfMiddleware::from_guard(guard))
        .dispatch(HttpRequest::new("GET", "/form"))
        .await;

    assert_eq!(resp.status, 500);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Internal Server Error" }));
}
