//! # Rampart HTTP
//!
//! The request/response model shared by Rampart middleware, an async
//! [`Middleware`] trait with a composable [`MiddlewareChain`], and a small
//! hyper-based [`Server`] for running a handler behind the chain.
//!
//! ```
//! use rampart_http::{handler, HttpRequest, HttpResponse, MiddlewareChain, LoggerMiddleware};
//!
//! # tokio_test::block_on(async {
//! let mut chain = MiddlewareChain::new();
//! chain.use_middleware(LoggerMiddleware::new());
//!
//! let hello = handler(|_req| async { Ok(HttpResponse::ok().with_body(b"hi".to_vec())) });
//! let resp = chain.apply(HttpRequest::new("GET", "/"), hello).await.unwrap();
//! assert_eq!(resp.body, b"hi");
//! # });
//! ```

pub mod error;
pub mod http;
pub mod middleware;
pub mod server;

pub use error::Error;
pub use self::http::{HttpRequest, HttpResponse};
pub use middleware::{
    BoxFuture, HandlerFn, LoggerMiddleware, Middleware, MiddlewareChain, Next, handler,
};
pub use server::Server;
