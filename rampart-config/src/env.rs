// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
enum Source {
    Process,
    Fixed(HashMap<String, String>),
}

/// Environment variable loader
///
/// Keys are upper-cased and joined to the prefix with `_`, so
/// `EnvLoader::new(Some("RAMPART_CSRF")).load_var("cookie_name")` reads
/// `RAMPART_CSRF_COOKIE_NAME`.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
    source: Source,
}

impl EnvLoader {
    /// Create a loader over the process environment
    pub fn new(prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            source: Source::Process,
        }
    }

    /// Create a loader over a fixed set of variables instead of the process
    /// environment. Keys are full variable names.
    pub fn from_vars<I, K, V>(prefix: Option<&str>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.map(str::to_string),
            source: Source::Fixed(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    fn raw(&self, full_key: &str) -> Option<String> {
        match &self.source {
            Source::Process => env::var(full_key).ok(),
            Source::Fixed(vars) => vars.get(full_key).cloned(),
        }
    }

    /// Load a specific variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = self.full_key(key);
        self.raw(&full_key).ok_or(ConfigError::KeyNotFound(full_key))
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Load and parse a variable. `Ok(None)` when unset.
    pub fn load_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let full_key = self.full_key(key);
        match self.raw(&full_key) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::ParseError {
                    key: full_key,
                    message: e.to_string(),
                }),
        }
    }

    /// Load a boolean flag (`1/0`, `true/false`, `yes/no`, `on/off`).
    pub fn load_bool(&self, key: &str) -> Result<Option<bool>> {
        let full_key = self.full_key(key);
        let Some(value) = self.raw(&full_key) else {
            return Ok(None);
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            other => Err(ConfigError::ParseError {
                key: full_key,
                message: format!("expected a boolean, got '{}'", other),
            }),
        }
    }

    /// Load a comma-separated list, trimming entries and dropping empty ones.
    pub fn load_list(&self, key: &str) -> Option<Vec<String>> {
        self.raw(&self.full_key(key)).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
