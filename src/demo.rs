// Demo application served by the `rampart-demo` binary

use rampart_csrf::{CsrfConfig, CsrfMiddleware, CsrfToken, Result};
use rampart_http::{
    Error, HandlerFn, HttpRequest, HttpResponse, LoggerMiddleware, MiddlewareChain, Server, handler,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Port used when `PORT` is not set
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

#[derive(Serialize)]
struct TokenBody {
    #[serde(rename = "csrfToken")]
    csrf_token: Option<String>,
}

#[derive(Serialize)]
struct Received {
    received: Map<String, Value>,
}

/// Build the demo server: request logging, then CSRF protection, then the
/// routes below.
pub fn app(config: CsrfConfig) -> Result<Server> {
    let mut chain = MiddlewareChain::new();
    chain.use_middleware(LoggerMiddleware::new());
    chain.use_middleware(CsrfMiddleware::new(config)?);

    Ok(Server::new(chain, routes()))
}

/// `GET /`, `GET /csrf-token` and `POST /submit`
pub fn routes() -> HandlerFn {
    handler(|req| async move {
        match (req.method.as_str(), req.path.as_str()) {
            ("GET", "/") => HttpResponse::ok().with_json(&Message {
                message: "Server is running with CSRF protection",
            }),
            // Reached only when the middleware's own token endpoint is off.
            ("GET", "/csrf-token") => HttpResponse::ok().with_json(&TokenBody {
                csrf_token: req.extensions.get::<CsrfToken>().map(|t| t.0.clone()),
            }),
            ("POST", "/submit") => HttpResponse::ok().with_json(&Received {
                received: submitted_fields(&req)?,
            }),
            (_, path) => Err(Error::NotFound(path.to_string())),
        }
    })
}

/// Body fields of a JSON or urlencoded submission, without the token.
fn submitted_fields(req: &HttpRequest) -> std::result::Result<Map<String, Value>, Error> {
    let mut fields = if req.body.is_empty() {
        Map::new()
    } else if req.has_content_type("application/json") {
        match req.json::<Value>()? {
            Value::Object(map) => map,
            _ => return Err(Error::BadRequest("expected a JSON object".to_string())),
        }
    } else {
        req.form::<HashMap<String, String>>()?
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect()
    };

    fields.remove("_csrf");
    Ok(fields)
}
