// Minimal HTTP/1.1 server driving a middleware chain

use crate::{Error, HandlerFn, HttpRequest, HttpResponse, MiddlewareChain};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, body::Incoming as IncomingBody};
use hyper_util::rt::TokioIo;
use rampart_log::{error, info, warn};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Serves one handler behind a middleware chain.
#[derive(Clone)]
pub struct Server {
    chain: MiddlewareChain,
    handler: HandlerFn,
}

impl Server {
    pub fn new(chain: MiddlewareChain, handler: HandlerFn) -> Self {
        Self { chain, handler }
    }

    /// Run a request through the chain and turn any error into a response.
    pub async fn dispatch(&self, req: HttpRequest) -> HttpResponse {
        match self.chain.apply(req, self.handler.clone()).await {
            Ok(response) => response,
            Err(err) => {
                if err.is_server_error() {
                    error!(error = %err, "request failed");
                }
                err.into_response()
            }
        }
    }

    /// Accept connections until the listener fails.
    pub async fn listen(self, addr: SocketAddr) -> Result<(), Error> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Server listening");

        loop {
            let (stream, peer) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let server = self.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<IncomingBody>| {
                    let server = server.clone();
                    async move { server.handle_hyper(req).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(%peer, error = %err, "Error serving connection");
                }
            });
        }
    }

    async fn handle_hyper(
        &self,
        req: Request<IncomingBody>,
    ) -> Result<Response<Full<Bytes>>, hyper::Error> {
        let mut request = HttpRequest::new(req.method().as_str(), req.uri().path());

        if let Some(query) = req.uri().query() {
            request.query_params = serde_urlencoded::from_str::<HashMap<String, String>>(query)
                .unwrap_or_default();
        }

        for (name, value) in req.headers() {
            if let Ok(value) = value.to_str() {
                request.append_header(name.as_str(), value);
            }
        }

        request.body = req.collect().await?.to_bytes().to_vec();

        let response = self.dispatch(request).await;
        Ok(into_hyper(response))
    }
}

fn into_hyper(response: HttpResponse) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(response.status);
    for (key, value) in response.headers {
        builder = builder.header(key, value);
    }

    builder
        .body(Full::new(Bytes::from(response.body)))
        .unwrap_or_else(|err| {
            error!(error = %err, "invalid response parts");
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}
