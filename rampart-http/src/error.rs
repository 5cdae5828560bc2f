// Error types for request handling

use crate::HttpResponse;
use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        let status = match self {
            Error::BadRequest(_) | Error::Deserialization(_) => StatusCode::BAD_REQUEST,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::Serialization(_) | Error::Internal(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        status.as_u16()
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Message safe to send to the client.
    ///
    /// Client errors carry their own message; server errors are reduced to a
    /// generic phrase so internals never reach the response body.
    pub fn public_message(&self) -> String {
        match self {
            Error::BadRequest(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::MethodNotAllowed(msg)
            | Error::Deserialization(msg) => msg.clone(),
            _ => "Internal Server Error".to_string(),
        }
    }

    /// Render as a JSON response of the form `{"error": "<message>"}`.
    pub fn into_response(self) -> HttpResponse {
        let status = self.status_code();
        let body = serde_json::json!({ "error": self.public_message() });
        HttpResponse::new(status)
            .with_json(&body)
            .unwrap_or_else(|_| HttpResponse::internal_server_error())
    }
}
