//! Bearer credential provider
//!
//! The persistent token store lives outside this client (the surrounding
//! application provisions it at login); this seam only hands the current
//! credential to the HTTP layer.

use crate::InfraError;

/// Source of the bearer credential attached to every API request
pub trait TokenProvider: Send + Sync {
    /// The current bearer token, without the "Bearer " prefix
    fn bearer_token(&self) -> Result<String, InfraError>;
}

/// Fixed token, for tests and one-off tooling
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Result<String, InfraError> {
        Ok(self.token.clone())
    }
}

/// Token read from an environment variable on every request, so an
/// externally refreshed credential is picked up without restarting
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenProvider for EnvTokenProvider {
    fn bearer_token(&self) -> Result<String, InfraError> {
        std::env::var(&self.var)
            .map_err(|_| InfraError::TokenUnavailable(format!("{} is not set", self.var)))
    }
}
