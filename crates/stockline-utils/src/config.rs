//! Environment-backed configuration helpers
//!
//! Configuration values come from the process environment. Lookups go through
//! the [`EnvSource`] trait so callers can substitute a map in tests instead of
//! mutating the real environment.

use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while reading configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// None of the accepted variable names is set
    #[error("missing environment variable: {}", .0.join(" or "))]
    Missing(Vec<String>),

    /// The variable is set but cannot be parsed
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// A source of configuration variables
pub trait EnvSource {
    /// Look up a single variable
    fn get(&self, name: &str) -> Option<String>;

    /// First non-empty value among `names`, in order
    fn first_of(&self, names: &[&str]) -> Option<String> {
        names
            .iter()
            .filter_map(|name| self.get(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }

    /// Like [`EnvSource::first_of`] but fails when nothing is set
    fn require(&self, names: &[&str]) -> Result<String, EnvError> {
        self.first_of(names)
            .ok_or_else(|| EnvError::Missing(names.iter().map(ToString::to_string).collect()))
    }

    /// Parse a variable, falling back to `default` when unset
    fn parse_or<T>(&self, name: &str, default: T) -> Result<T, EnvError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.first_of(&[name]) {
            Some(raw) => raw.parse().map_err(|e: T::Err| EnvError::Invalid {
                name: name.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

/// Load a `.env` file from the working directory if one exists
///
/// Returns the path that was loaded. A missing file is not an error.
pub fn load_dotenv() -> Option<std::path::PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Failed to load .env file: {e}");
            None
        }
    }
}
