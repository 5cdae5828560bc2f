use crate::error::{CsrfError, Result};
use rampart_config::EnvLoader;

/// Smallest accepted secret, in random bytes.
pub const MIN_SECRET_SIZE: usize = 32;

/// Largest accepted secret, in random bytes. Keeps the encoded cookie
/// within [`crate::Secret::MAX_LEN`].
pub const MAX_SECRET_SIZE: usize = 384;

/// CSRF protection configuration
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// Name of the cookie carrying the session secret
    pub cookie_name: String,

    /// Random bytes per minted secret (at least 32)
    pub secret_size: usize,

    /// Lifetime of the secret cookie in seconds (`Max-Age`)
    pub token_max_age: i64,

    /// Cookie `Secure` flag (HTTPS only)
    pub secure: bool,

    /// Cookie `HttpOnly` flag
    pub http_only: bool,

    /// Cookie `SameSite` policy
    pub same_site: SameSite,

    pub cookie_path: String,

    pub cookie_domain: Option<String>,

    /// Methods exempt from token verification
    pub ignored_methods: Vec<String>,

    /// Body field checked for a submitted token
    pub field_name: String,

    /// Headers checked for a submitted token, in order
    pub header_names: Vec<String>,

    /// Path prefixes the guard ignores entirely
    pub exclude_paths: Vec<String>,

    /// Path of the built-in token endpoint, `None` to disable it
    pub token_path: Option<String>,

    /// Whether an unsafe request without a secret cookie gets a fresh
    /// secret (and then fails token checks) or is refused outright with
    /// `MissingSecret`
    pub mint_on_unsafe: bool,
}

/// Cookie SameSite attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

impl From<SameSite> for cookie::SameSite {
    fn from(value: SameSite) -> Self {
        match value {
            SameSite::Strict => cookie::SameSite::Strict,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::None => cookie::SameSite::None,
        }
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CsrfConfig {
    /// Environment variable prefix used by [`CsrfConfig::from_env`]
    pub const ENV_PREFIX: &'static str = "RAMPART_CSRF";

    /// Create a configuration with the default settings
    pub fn new() -> Self {
        Self {
            cookie_name: "_csrf_secret".to_string(),
            secret_size: MIN_SECRET_SIZE,
            token_max_age: 3600,
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
            cookie_path: "/".to_string(),
            cookie_domain: None,
            ignored_methods: vec!["GET".to_string(), "HEAD".to_string(), "OPTIONS".to_string()],
            field_name: "_csrf".to_string(),
            header_names: vec!["x-csrf-token".to_string(), "csrf-token".to_string()],
            exclude_paths: Vec::new(),
            token_path: Some("/csrf-token".to_string()),
            mint_on_unsafe: true,
        }
    }

    /// Build from the process environment.
    ///
    /// Reads `RAMPART_CSRF_COOKIE_NAME`, `_SECRET_SIZE`, `_MAX_AGE`,
    /// `_SECURE`, `_SAME_SITE`, `_IGNORED_METHODS`, `_EXCLUDE_PATHS` and
    /// `_TOKEN_PATH`. Without `RAMPART_CSRF_SECURE`, the `Secure` flag
    /// follows `RAMPART_ENV=production`.
    pub fn from_env() -> Result<Self> {
        Self::from_loader(&EnvLoader::new(None))
    }

    /// Build from an unprefixed loader (see [`CsrfConfig::from_env`]).
    pub fn from_loader(loader: &EnvLoader) -> Result<Self> {
        let key = |name: &str| format!("{}_{}", Self::ENV_PREFIX, name);
        let mut config = Self::new();

        if let Ok(name) = loader.load_var(&key("COOKIE_NAME")) {
            config.cookie_name = name;
        }
        if let Some(size) = loader.load_parsed::<usize>(&key("SECRET_SIZE"))? {
            config.secret_size = size;
        }
        if let Some(max_age) = loader.load_parsed::<i64>(&key("MAX_AGE"))? {
            config.token_max_age = max_age;
        }
        config.secure = match loader.load_bool(&key("SECURE"))? {
            Some(secure) => secure,
            None => loader
                .load_var("RAMPART_ENV")
                .map(|env| env.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
        };
        if let Ok(same_site) = loader.load_var(&key("SAME_SITE")) {
            config.same_site = SameSite::parse(&same_site).ok_or_else(|| {
                CsrfError::Config(format!("unknown SameSite policy '{}'", same_site))
            })?;
        }
        if let Some(methods) = loader.load_list(&key("IGNORED_METHODS")) {
            config.ignored_methods = methods;
        }
        if let Some(paths) = loader.load_list(&key("EXCLUDE_PATHS")) {
            config.exclude_paths = paths;
        }
        if let Ok(path) = loader.load_var(&key("TOKEN_PATH")) {
            config.token_path = if path.is_empty() { None } else { Some(path) };
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the settings for values that would weaken or break protection.
    pub fn validate(&self) -> Result<()> {
        if self.secret_size < MIN_SECRET_SIZE {
            return Err(CsrfError::Config(format!(
                "secret size must be at least {} bytes, got {}",
                MIN_SECRET_SIZE, self.secret_size
            )));
        }
        if self.secret_size > MAX_SECRET_SIZE {
            return Err(CsrfError::Config(format!(
                "secret size must be at most {} bytes, got {}",
                MAX_SECRET_SIZE, self.secret_size
            )));
        }
        if self.token_max_age <= 0 {
            return Err(CsrfError::Config("cookie max age must be positive".to_string()));
        }
        if self.cookie_name.is_empty()
            || !self
                .cookie_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"_-.".contains(&b))
        {
            return Err(CsrfError::Config(format!(
                "invalid cookie name '{}'",
                self.cookie_name
            )));
        }
        if self.same_site == SameSite::None && !self.secure {
            return Err(CsrfError::Config(
                "SameSite=None requires the Secure flag".to_string(),
            ));
        }
        if self.field_name.is_empty() && self.header_names.is_empty() {
            return Err(CsrfError::Config(
                "at least one token channel is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the secret cookie name
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set random bytes per secret
    pub fn with_secret_size(mut self, size: usize) -> Self {
        self.secret_size = size;
        self
    }

    /// Set the secret cookie lifetime in seconds
    pub fn with_token_max_age(mut self, seconds: i64) -> Self {
        self.token_max_age = seconds;
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    /// Replace the set of methods exempt from verification
    pub fn with_ignored_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Replace the header list checked for tokens
    pub fn with_header_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add excluded path prefixes
    pub fn with_exclude_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Serve the token endpoint at `path`, or disable it with `None`
    pub fn with_token_path(mut self, path: Option<&str>) -> Self {
        self.token_path = path.map(str::to_string);
        self
    }

    pub fn with_mint_on_unsafe(mut self, mint: bool) -> Self {
        self.mint_on_unsafe = mint;
        self
    }
}
