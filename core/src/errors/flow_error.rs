//! Flow error taxonomy
//!
//! Every failure a purchase session can hit is one of these variants, each
//! with a stable code for programmatic handling. The flow converts all of
//! them into a single user-facing notification at its boundary; nothing
//! propagates past it unhandled.

use thiserror::Error;

use crate::domain::entities::Step;
use nr_shared::Credits;

/// Result alias for flow operations
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors produced by the verification purchase flow
#[derive(Error, Debug)]
pub enum FlowError {
    /// A wizard stage was requested before its prerequisite selection
    #[error("Missing selection: {field}")]
    MissingSelection { field: &'static str },

    /// Navigation that the forward-only step ordering forbids
    #[error("Cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: Step, to: Step },

    /// The wallet balance does not cover the quoted cost (local check or
    /// HTTP 402 from the purchase endpoint)
    #[error("Insufficient balance: need {required} credits, have {available}")]
    InsufficientBalance {
        required: Credits,
        available: Credits,
    },

    /// The bearer credential was rejected (HTTP 401); the caller is
    /// expected to discard local state and return to login
    #[error("Session expired, please log in again")]
    AuthExpired,

    /// The upstream number provider is unavailable (HTTP 503)
    #[error("Provider temporarily unavailable, try another service")]
    ProviderUnavailable,

    /// Any other 4xx/5xx, with the server's detail text when it sent one
    #[error("Request failed ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// No response received at the transport level
    #[error("Network error: {message}")]
    Network { message: String },

    /// The polling ceiling elapsed without a delivered code; routes to the
    /// retry menu rather than a dead end
    #[error("No code arrived before the polling deadline")]
    PollTimeout,

    /// The retry allowance is exhausted; only cancellation remains
    #[error("Maximum retries exceeded, only cancellation is available")]
    MaxRetriesExceeded,

    /// The operation is meaningless for a finished session; raised locally
    /// without a network call
    #[error("Session is already finished")]
    AlreadyTerminal,

    /// A purchase request is already outstanding for this session
    #[error("A purchase request is already in flight")]
    PurchaseInFlight,

    /// The retry menu was requested outside the post-timeout window
    #[error("Retry is only available after a polling timeout")]
    RetryNotAvailable,
}

impl FlowError {
    /// Stable error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            FlowError::MissingSelection { .. } => "MISSING_SELECTION",
            FlowError::InvalidTransition { .. } => "INVALID_TRANSITION",
            FlowError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            FlowError::AuthExpired => "AUTH_EXPIRED",
            FlowError::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            FlowError::Api { .. } => "API_ERROR",
            FlowError::Network { .. } => "NETWORK_ERROR",
            FlowError::PollTimeout => "POLL_TIMEOUT",
            FlowError::MaxRetriesExceeded => "MAX_RETRIES_EXCEEDED",
            FlowError::AlreadyTerminal => "ALREADY_TERMINAL",
            FlowError::PurchaseInFlight => "PURCHASE_IN_FLIGHT",
            FlowError::RetryNotAvailable => "RETRY_NOT_AVAILABLE",
        }
    }

    /// Whether the triggering action can simply be re-enabled for a manual
    /// retry (transient transport failures)
    pub fn is_transient(&self) -> bool {
        matches!(self, FlowError::Network { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_message_names_both_amounts() {
        let err = FlowError::InsufficientBalance {
            required: Credits(2.5),
            available: Credits(1.0),
        };
        let message = err.to_string();
        assert!(message.contains("2.50"));
        assert!(message.contains("1.00"));
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
    }

    #[test]
    fn api_error_carries_status_and_detail() {
        let err = FlowError::Api {
            status: 500,
            detail: "internal error".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("internal error"));
    }

    #[test]
    fn only_network_errors_are_transient() {
        assert!(FlowError::Network {
            message: "timed out".to_string()
        }
        .is_transient());
        assert!(!FlowError::AuthExpired.is_transient());
        assert!(!FlowError::ProviderUnavailable.is_transient());
    }
}
