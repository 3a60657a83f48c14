//! Error types for the purchase flow

mod flow_error;

pub use flow_error::{FlowError, FlowResult};
