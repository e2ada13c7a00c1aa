//! YouTube proof-of-origin token

use crate::error::ConfigError;
use secrecy::{ExposeSecret, SecretString};

/// Opaque credential handed to the platform client.
///
/// Wrapped in a [`SecretString`] so it never shows up in `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Build a token, rejecting empty or whitespace-only values.
    ///
    /// `source` names where the operator should put the token and ends up in
    /// the error message.
    pub fn new(value: impl Into<String>, source: &str) -> Result<Self, ConfigError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::ConfigurationMissing(source.to_string()));
        }
        Ok(Self(SecretString::from(trimmed.to_string())))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}
