//! Common types shared across the client crates

mod credits;
mod response;

pub use credits::Credits;
pub use response::ApiErrorBody;
