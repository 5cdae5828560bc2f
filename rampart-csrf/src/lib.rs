//! # Rampart CSRF Protection
//!
//! Double-submit cookie CSRF protection for Rampart applications.
//!
//! ## Features
//!
//! - ✅ **Stateless** - The per-session secret lives in a cookie; the server stores nothing
//! - ✅ **Signed Tokens** - HMAC-SHA256 over a fresh nonce, verified in constant time
//! - ✅ **Method Policy** - GET, HEAD and OPTIONS are exempt by default
//! - ✅ **Multiple Channels** - Body field `_csrf`, `x-csrf-token` or `csrf-token` header
//! - ✅ **Opaque Rejections** - Every failure is the same 403
//! - ✅ **Path Exclusion** - Exclude specific paths from protection
//!
//! ## Quick Start
//!
//! ```rust
//! use rampart_csrf::{CsrfConfig, CsrfMiddleware};
//!
//! let config = CsrfConfig::default()
//!     .with_token_max_age(1800)
//!     .with_secure(false);
//!
//! let csrf = CsrfMiddleware::new(config).unwrap();
//! ```
//!
//! ## Issuing and Checking Tokens
//!
//! ```rust
//! use rampart_csrf::{CsrfConfig, CsrfGuard, Outcome};
//! use rampart_http::HttpRequest;
//!
//! let guard = CsrfGuard::new(CsrfConfig::default()).unwrap();
//!
//! // A safe request gets a token and, on first visit, a secret cookie.
//! let decision = guard.evaluate(&HttpRequest::new("GET", "/form")).unwrap();
//! let token = decision.token().unwrap().to_string();
//! let cookie = decision.set_cookie.unwrap();
//!
//! // An unsafe request must send both back.
//! let post = HttpRequest::new("POST", "/form")
//!     .with_header("Cookie", format!("{}={}", cookie.name, cookie.secret.expose()))
//!     .with_header("x-csrf-token", token);
//! assert_eq!(guard.evaluate(&post).unwrap().outcome, Outcome::Verified);
//! ```
//!
//! ## Usage with a Server
//!
//! ```ignore
//! use rampart_csrf::{CsrfConfig, CsrfMiddleware, CsrfToken};
//! use rampart_http::{handler, HttpResponse, MiddlewareChain, Server};
//!
//! let mut chain = MiddlewareChain::new();
//! chain.use_middleware(CsrfMiddleware::new(CsrfConfig::from_env()?)?);
//!
//! let form = handler(|req| async move {
//!     let token = req.extensions.get::<CsrfToken>().cloned();
//!     // render the token into the page ...
//!     Ok(HttpResponse::ok())
//! });
//!
//! Server::new(chain, form).listen(addr).await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod guard;
pub mod middleware;
pub mod policy;
pub mod random;
pub mod secret;
pub mod token;

pub use config::{CsrfConfig, MAX_SECRET_SIZE, MIN_SECRET_SIZE, SameSite};
pub use error::{CsrfError, ErrorSignal, REJECTION_MESSAGE, Result};
pub use extract::{TokenSource, TokenSources};
pub use guard::{CsrfGuard, Decision, Outcome, Verdict};
pub use middleware::CsrfMiddleware;
pub use policy::{MethodClass, MethodPolicy};
pub use random::{OsRandom, RandomSource};
pub use secret::{Resolution, Secret, SecretStore, SetCookie};
pub use token::{CsrfToken, TOKEN_LEN, TokenCodec, Verification};
