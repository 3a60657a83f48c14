//! # NumRelay Shared
//!
//! Configuration types, common wire types, and small utilities shared by the
//! NumRelay client crates.

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{ApiConfig, FlowConfig, PollCadence};
pub use types::{ApiErrorBody, Credits};
