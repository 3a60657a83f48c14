//! Request, retry, and notification types for the purchase flow

use serde::{Deserialize, Serialize};

use crate::domain::entities::Capability;
use nr_shared::Credits;

/// Parameters for a price quote or purchase request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    /// Country code of the number
    pub country: String,
    /// Service the code is for
    pub service: String,
    /// Delivery capability
    pub capability: Capability,
    /// Optional carrier filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    /// Optional area-code filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_code: Option<String>,
}

/// The retry actions that issue or re-arm verification work after a
/// polling timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryKind {
    /// Switch SMS to voice (or back) on the same purchase context
    SwitchCapability,
    /// Keep the same verification id and just poll again
    SameNumber,
    /// Purchase a fresh number for the same service
    NewNumber,
}

impl RetryKind {
    /// Wire identifier used by the backend retry endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryKind::SwitchCapability => "switch_capability",
            RetryKind::SameNumber => "same_number",
            RetryKind::NewNumber => "new_number",
        }
    }
}

/// Entries of the post-timeout retry menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryMenuOption {
    SwitchCapability,
    SameNumber,
    NewNumber,
    CancelAndRefund,
}

/// User-facing events emitted by the flow.
///
/// Consumers (balance widget, activity list, toast surface) are expected to
/// re-fetch their own authoritative state on these rather than receive it
/// inline; amounts included here are for display only.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Purchase accepted; polling for the code has started
    PurchaseCompleted {
        verification_id: String,
        phone_number: String,
        cost: Credits,
    },
    /// Purchase failed with a user-facing message; the session stays on
    /// the confirm step
    PurchaseFailed { message: String },
    /// The verification code arrived
    CodeReceived { code: String },
    /// Periodic reassurance while polling backs off to a slower tier
    StillWaiting { elapsed_secs: u64 },
    /// The polling ceiling elapsed; the retry menu is available
    PollTimedOut,
    /// A cancellation was refunded
    RefundIssued { amount: Credits },
    /// The wallet balance changed; consumers should re-fetch it
    BalanceChanged { balance: Credits },
    /// The bearer credential expired; the front end should return to login
    SessionExpired,
    /// The balance does not cover the quoted cost (inline warning)
    InsufficientBalance {
        required: Credits,
        available: Credits,
    },
}
