use crate::config::CsrfConfig;
use crate::error::{CsrfError, ErrorSignal, Result};
use crate::extract::TokenSources;
use crate::policy::{MethodClass, MethodPolicy};
use crate::random::{OsRandom, RandomSource};
use crate::secret::{Resolution, Secret, SecretStore, SetCookie};
use crate::token::TokenCodec;
use rampart_http::HttpRequest;
use rampart_log::{debug, error, warn};
use std::sync::Arc;

/// What the guard concluded about a request it let through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Path is excluded; nothing was resolved or checked
    Excluded,
    /// Safe method; a token was issued for the handler to hand out
    Issued(String),
    /// Unsafe method carrying a valid token
    Verified,
}

/// Outcome of [`CsrfGuard::evaluate`], plus the cookie to set if a secret
/// was minted along the way.
#[derive(Debug, Clone)]
pub struct Decision {
    pub outcome: Outcome,
    pub set_cookie: Option<SetCookie>,
}

impl Decision {
    /// Token issued for this request, if any
    pub fn token(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Issued(token) => Some(token),
            _ => None,
        }
    }
}

/// Result of [`CsrfGuard::inspect`].
///
/// The secret is resolved before the request is classified, so a secret
/// minted along the way comes back in `set_cookie` even when `result` is a
/// rejection.
#[derive(Debug)]
pub struct Verdict {
    pub result: Result<Outcome>,
    pub set_cookie: Option<SetCookie>,
}

impl Verdict {
    fn failed(err: CsrfError) -> Self {
        Self {
            result: Err(err),
            set_cookie: None,
        }
    }
}

/// Per-request CSRF decision.
///
/// Safe methods get a token derived from the session secret (minting the
/// secret if the request has none). Unsafe methods must present a token
/// derived from the secret in their cookie. The guard holds no mutable
/// state and is shared across requests behind an `Arc`.
#[derive(Clone)]
pub struct CsrfGuard {
    config: Arc<CsrfConfig>,
    policy: MethodPolicy,
    sources: TokenSources,
    secrets: SecretStore,
    codec: TokenCodec,
}

impl CsrfGuard {
    /// Create a guard using the operating system random source
    pub fn new(config: CsrfConfig) -> Result<Self> {
        Self::with_random(config, Arc::new(OsRandom))
    }

    /// Create a guard drawing secrets and nonces from `random`
    pub fn with_random(config: CsrfConfig, random: Arc<dyn RandomSource>) -> Result<Self> {
        config.validate()?;

        let config = Arc::new(config);
        Ok(Self {
            policy: MethodPolicy::new(&config.ignored_methods),
            sources: TokenSources::from_config(&config),
            secrets: SecretStore::new(config.clone(), random.clone()),
            codec: TokenCodec::new(random),
            config,
        })
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Whether `path` falls under one of the excluded prefixes.
    ///
    /// Prefixes match whole path segments: `/api` covers `/api` and
    /// `/api/users` but not `/apiary`.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.config.exclude_paths.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str()).is_some_and(|rest| {
                rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/')
            })
        })
    }

    /// Decide whether `request` may continue.
    ///
    /// Rejections come back as [`CsrfError::Rejected`]; entropy failures as
    /// [`CsrfError::Entropy`]. Use [`CsrfGuard::inspect`] to also receive a
    /// cookie minted for a request that was then refused.
    pub fn evaluate(&self, request: &HttpRequest) -> Result<Decision> {
        let verdict = self.inspect(request);
        verdict.result.map(|outcome| Decision {
            outcome,
            set_cookie: verdict.set_cookie,
        })
    }

    /// Run the check and return its result together with any cookie
    /// directive, whether or not the request passed.
    pub fn inspect(&self, request: &HttpRequest) -> Verdict {
        if self.is_excluded(&request.path) {
            debug!(path = %request.path, "CSRF check skipped for excluded path");
            return Verdict {
                result: Ok(Outcome::Excluded),
                set_cookie: None,
            };
        }

        let verdict = match self.policy.classify(&request.method) {
            MethodClass::Safe => self.issue(request),
            MethodClass::Unsafe => self.validate(request),
        };

        let minted = verdict.set_cookie.is_some();
        match &verdict.result {
            Ok(outcome) => debug!(
                method = %request.method,
                path = %request.path,
                minted,
                verified = *outcome == Outcome::Verified,
                "CSRF check passed"
            ),
            Err(CsrfError::Rejected(signal)) => warn!(
                method = %request.method,
                path = %request.path,
                minted,
                signal = ?signal,
                "CSRF check rejected request"
            ),
            Err(err) => error!(
                method = %request.method,
                path = %request.path,
                error = %err,
                "CSRF check failed"
            ),
        }

        verdict
    }

    fn issue(&self, request: &HttpRequest) -> Verdict {
        let incoming = request.cookie(&self.config.cookie_name);
        let resolution = match self.secrets.resolve(incoming.as_deref()) {
            Ok(resolution) => resolution,
            Err(err) => return Verdict::failed(err),
        };

        Verdict {
            result: self.codec.issue(&resolution.secret).map(Outcome::Issued),
            set_cookie: resolution.set_cookie,
        }
    }

    fn validate(&self, request: &HttpRequest) -> Verdict {
        let incoming = request.cookie(&self.config.cookie_name);

        let resolution = if self.config.mint_on_unsafe {
            match self.secrets.resolve(incoming.as_deref()) {
                Ok(resolution) => resolution,
                Err(err) => return Verdict::failed(err),
            }
        } else {
            match self.secrets.lookup(incoming.as_deref()) {
                Some(secret) => Resolution {
                    secret,
                    set_cookie: None,
                },
                None => return Verdict::failed(ErrorSignal::MissingSecret.into()),
            }
        };

        Verdict {
            result: self.check_candidate(request, &resolution.secret),
            set_cookie: resolution.set_cookie,
        }
    }

    // A secret minted just now has no tokens, so this can only fail for it.
    fn check_candidate(&self, request: &HttpRequest, secret: &Secret) -> Result<Outcome> {
        let candidate = self
            .sources
            .find(request)
            .ok_or(ErrorSignal::MissingToken)?;

        match self.codec.check(secret, &candidate).signal() {
            None => Ok(Outcome::Verified),
            Some(signal) => Err(signal.into()),
        }
    }
}
