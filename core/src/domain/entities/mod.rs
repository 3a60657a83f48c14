//! Domain entities

pub mod session;

pub use session::{Capability, Step, VerificationSession, DEFAULT_MAX_RETRIES};
