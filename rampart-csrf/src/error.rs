use thiserror::Error;

/// Message sent to clients for every rejection, whatever the cause.
pub const REJECTION_MESSAGE: &str = "Invalid CSRF token";

/// Why a request was refused.
///
/// The set is closed and carries no token or secret material, so it is
/// safe to log. Clients never see which variant fired.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSignal {
    #[error("no session secret available")]
    MissingSecret,

    #[error("no CSRF token supplied")]
    MissingToken,

    #[error("CSRF token does not match session secret")]
    TokenMismatch,

    #[error("CSRF token is malformed")]
    MalformedToken,
}

#[derive(Error, Debug)]
pub enum CsrfError {
    #[error("CSRF rejection: {0}")]
    Rejected(#[from] ErrorSignal),

    #[error("random source failure: {0}")]
    Entropy(String),

    #[error("invalid CSRF configuration: {0}")]
    Config(String),
}

impl CsrfError {
    /// The rejection reason, if this error is a CSRF rejection
    pub fn signal(&self) -> Option<ErrorSignal> {
        match self {
            CsrfError::Rejected(signal) => Some(*signal),
            _ => None,
        }
    }
}

impl From<rand::Error> for CsrfError {
    fn from(err: rand::Error) -> Self {
        CsrfError::Entropy(err.to_string())
    }
}

impl From<rampart_config::ConfigError> for CsrfError {
    fn from(err: rampart_config::ConfigError) -> Self {
        CsrfError::Config(err.to_string())
    }
}

impl From<CsrfError> for rampart_http::Error {
    fn from(err: CsrfError) -> Self {
        match err {
            CsrfError::Rejected(_) => rampart_http::Error::Forbidden(REJECTION_MESSAGE.to_string()),
            other => rampart_http::Error::Internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CsrfError>;
