//! # NumRelay Core
//!
//! Domain layer for the NumRelay verification-purchase client. This crate
//! contains the verification session entity and its step state machine, the
//! flow error taxonomy, and the purchase-flow service that drives a session
//! from country selection through code delivery against trait seams to the
//! backend API, the wallet, and the notification surface.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
