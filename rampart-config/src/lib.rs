// Configuration loading for Rampart services
//
// Values come from the process environment (optionally seeded from a
// `.env` file) and are looked up through an `EnvLoader` with an optional
// key prefix.

pub mod env;
pub mod error;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};

/// Load a `.env` file into the process environment.
///
/// With no path, searches the current directory and its parents. A missing
/// default file is not an error; a missing explicit path is.
pub fn load_dotenv(path: Option<&str>) -> Result<()> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map(|_| ())
            .map_err(|e| ConfigError::LoadError(e.to_string())),
        None => match dotenvy::dotenv() {
            Ok(_) => Ok(()),
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(ConfigError::LoadError(e.to_string())),
        },
    }
}
