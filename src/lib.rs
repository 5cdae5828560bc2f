// Rampart - stateless CSRF protection for async Rust HTTP services
//
// This crate bundles the Rampart workspace: the double-submit cookie guard,
// the HTTP primitives it plugs into, and the logging and configuration
// layers shared by both.

// Re-export the CSRF core at the top level
pub use rampart_csrf::*;

// Re-export the supporting crates
pub use rampart_config;
pub use rampart_csrf;
pub use rampart_http;
pub use rampart_log;

pub mod demo;

/// Prelude for common imports
pub mod prelude {
    pub use rampart_csrf::{
        CsrfConfig, CsrfError, CsrfGuard, CsrfMiddleware, CsrfToken, ErrorSignal, SameSite,
    };
    pub use rampart_http::{
        Error, HttpRequest, HttpResponse, LoggerMiddleware, Middleware, MiddlewareChain, Next,
        Server, handler,
    };
    pub use rampart_log::{LogConfig, debug, error, info, trace, warn};
}
