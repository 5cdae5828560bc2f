use crate::config::CsrfConfig;
use crate::error::Result;
use crate::guard::{CsrfGuard, Outcome, Verdict};
use crate::secret::SetCookie;
use crate::token::CsrfToken;
use async_trait::async_trait;
use rampart_http::{Error, HttpRequest, HttpResponse, Middleware, Next};
use rampart_log::{debug, error};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct TokenBody<'a> {
    #[serde(rename = "csrfToken")]
    csrf_token: &'a str,
}

/// CSRF protection middleware
///
/// Runs [`CsrfGuard::inspect`] before the rest of the chain. Issued tokens
/// are stored in the request extensions as [`CsrfToken`]; a newly minted
/// secret is appended to the response as a `Set-Cookie` header. Rejected
/// requests never reach the handler.
///
/// Once a secret has been minted the cookie is attached to every response
/// for that request, including the 403 for a rejected request and error
/// responses returned by the handler. Those errors are rendered here so the
/// header is not lost.
#[derive(Clone)]
pub struct CsrfMiddleware {
    guard: Arc<CsrfGuard>,
}

impl CsrfMiddleware {
    /// Create new CSRF middleware, validating `config`
    pub fn new(config: CsrfConfig) -> Result<Self> {
        Ok(Self::from_guard(CsrfGuard::new(config)?))
    }

    pub fn from_guard(guard: CsrfGuard) -> Self {
        Self {
            guard: Arc::new(guard),
        }
    }

    pub fn guard(&self) -> &CsrfGuard {
        &self.guard
    }

    fn is_token_endpoint(&self, req: &HttpRequest) -> bool {
        req.method.eq_ignore_ascii_case("GET")
            && self
                .guard
                .config()
                .token_path
                .as_deref()
                .is_some_and(|path| path == req.path)
    }

    fn token_response(token: &str) -> std::result::Result<HttpResponse, Error> {
        HttpResponse::ok().with_json(&TokenBody { csrf_token: token })
    }

    fn apply_cookie(set_cookie: Option<&SetCookie>, mut response: HttpResponse) -> HttpResponse {
        if let Some(set_cookie) = set_cookie {
            response.append_header("Set-Cookie", set_cookie.header_value());
        }
        response
    }

    /// Pass `result` through, rendering an error as a response when a
    /// cookie still has to reach the client.
    fn finish(
        set_cookie: Option<&SetCookie>,
        result: std::result::Result<HttpResponse, Error>,
    ) -> std::result::Result<HttpResponse, Error> {
        match (result, set_cookie) {
            (Ok(response), _) => Ok(Self::apply_cookie(set_cookie, response)),
            (Err(err), None) => Err(err),
            (Err(err), Some(_)) => {
                if err.is_server_error() {
                    error!(error = %err, "request failed");
                }
                Ok(Self::apply_cookie(set_cookie, err.into_response()))
            }
        }
    }
}

#[async_trait]
impl Middleware for CsrfMiddleware {
    async fn handle(
        &self,
        mut req: HttpRequest,
        next: Next,
    ) -> std::result::Result<HttpResponse, Error> {
        let Verdict { result, set_cookie } = self.guard.inspect(&req);
        let set_cookie = set_cookie.as_ref();

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => return Self::finish(set_cookie, Err(err.into())),
        };

        if let Outcome::Issued(token) = outcome {
            if self.is_token_endpoint(&req) {
                debug!(path = %req.path, "Serving CSRF token");
                return Self::finish(set_cookie, Self::token_response(&token));
            }
            req.extensions.insert(CsrfToken(token));
        }

        Self::finish(set_cookie, next(req).await)
    }
}
