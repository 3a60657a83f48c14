//! Configuration modules for the NumRelay client

mod api;
mod flow;

pub use api::ApiConfig;
pub use flow::{FlowConfig, PollCadence};
