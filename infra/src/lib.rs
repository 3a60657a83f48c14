//! # NumRelay Infrastructure
//!
//! Concrete implementations of the core trait seams: the reqwest-based
//! backend API client and the bearer-token provider.

pub mod auth;
pub mod http;

use thiserror::Error;

pub use auth::{EnvTokenProvider, StaticTokenProvider, TokenProvider};
pub use http::ApiClient;

/// Infrastructure-level errors (configuration and client construction)
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bearer token unavailable: {0}")]
    TokenUnavailable(String),
}
