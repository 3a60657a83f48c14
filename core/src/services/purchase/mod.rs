//! Verification purchase flow
//!
//! This module drives one purchase session from country selection through
//! code delivery:
//! - Forward-only wizard navigation with prerequisite validation
//! - Cost confirmation against a freshly fetched wallet balance
//! - Purchase submission with a full HTTP error taxonomy
//! - Adaptive code polling with an absolute ceiling and cooperative
//!   cancellation
//! - Post-timeout retry menu and cancel-with-refund

mod config;
mod polling;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::PurchaseFlowConfig;
pub use polling::{poll_interval, PollHandle};
pub use service::PurchaseFlow;
pub use traits::{NotificationSink, VerificationApi, WalletApi};
pub use types::{Notification, PurchaseRequest, RetryKind, RetryMenuOption};
