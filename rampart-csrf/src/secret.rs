use crate::config::{CsrfConfig, SameSite};
use crate::error::Result;
use crate::random::RandomSource;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use cookie::{Cookie, time::Duration};
use std::fmt;
use std::sync::Arc;

/// Per-session secret as carried in the cookie.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Shortest accepted cookie value
    pub const MIN_LEN: usize = 32;
    /// Longest accepted cookie value
    pub const MAX_LEN: usize = 512;

    /// Accept a cookie value as a secret if it is well formed: 32 to 512
    /// characters from the URL-safe base64 alphabet.
    pub fn parse(value: &str) -> Option<Self> {
        let well_formed = (Self::MIN_LEN..=Self::MAX_LEN).contains(&value.len())
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        well_formed.then(|| Secret(value.to_string()))
    }

    /// Cookie value; the only place the secret should ever be written.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// HMAC key material
    pub(crate) fn key_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Instruction to set the secret cookie on the outgoing response.
#[derive(Debug, Clone)]
pub struct SetCookie {
    pub name: String,
    pub secret: Secret,
    pub path: String,
    pub domain: Option<String>,
    pub max_age: i64,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl SetCookie {
    /// Render as a `Set-Cookie` header value
    pub fn header_value(&self) -> String {
        let mut builder = Cookie::build((self.name.clone(), self.secret.expose().to_string()))
            .path(self.path.clone())
            .max_age(Duration::seconds(self.max_age))
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site.into());

        if let Some(ref domain) = self.domain {
            builder = builder.domain(domain.clone());
        }

        builder.build().to_string()
    }
}

/// Result of [`SecretStore::resolve`]
#[derive(Debug, Clone)]
pub struct Resolution {
    pub secret: Secret,
    /// Present only when a new secret was minted
    pub set_cookie: Option<SetCookie>,
}

/// Reads the secret from the request cookie or mints a new one.
///
/// Holds no per-session state: everything it knows about a session comes
/// from the cookie value passed in.
#[derive(Clone)]
pub struct SecretStore {
    config: Arc<CsrfConfig>,
    random: Arc<dyn RandomSource>,
}

impl SecretStore {
    pub fn new(config: Arc<CsrfConfig>, random: Arc<dyn RandomSource>) -> Self {
        Self { config, random }
    }

    /// Parse the incoming cookie value without minting.
    pub fn lookup(&self, incoming: Option<&str>) -> Option<Secret> {
        incoming.and_then(Secret::parse)
    }

    /// Return the incoming secret unchanged, or mint a new one together
    /// with the cookie directive that persists it.
    pub fn resolve(&self, incoming: Option<&str>) -> Result<Resolution> {
        if let Some(secret) = self.lookup(incoming) {
            return Ok(Resolution {
                secret,
                set_cookie: None,
            });
        }

        let secret = self.mint()?;
        let set_cookie = SetCookie {
            name: self.config.cookie_name.clone(),
            secret: secret.clone(),
            path: self.config.cookie_path.clone(),
            domain: self.config.cookie_domain.clone(),
            max_age: self.config.token_max_age,
            secure: self.config.secure,
            http_only: self.config.http_only,
            same_site: self.config.same_site,
        };

        Ok(Resolution {
            secret,
            set_cookie: Some(set_cookie),
        })
    }

    fn mint(&self) -> Result<Secret> {
        let mut bytes = vec![0u8; self.config.secret_size];
        self.random.fill(&mut bytes)?;
        Ok(Secret(URL_SAFE_NO_PAD.encode(bytes)))
    }
}
