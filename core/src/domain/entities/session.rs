//! Verification purchase session entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::PurchaseReceipt;
use crate::errors::{FlowError, FlowResult};
use nr_shared::Credits;

/// Default maximum uses of the post-timeout retry menu per session
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delivery capability of a purchased verification number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Receive the code as an SMS text message
    #[default]
    Sms,
    /// Receive the code as a voice call transcription
    Voice,
}

impl Capability {
    /// Wire identifier used by the backend API
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Sms => "sms",
            Capability::Voice => "voice",
        }
    }

    /// The other capability, for the switch-capability retry
    pub fn toggled(&self) -> Capability {
        match self {
            Capability::Sms => Capability::Voice,
            Capability::Voice => Capability::Sms,
        }
    }
}

/// Wizard stage of a verification purchase session.
///
/// A session only moves forward through these stages; the retry menu is the
/// one exception and returns an AwaitingCode session to AwaitingCode with a
/// fresh or reused verification id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Choosing the number's country
    SelectLocation,
    /// Choosing the service the code is for
    SelectService,
    /// Choosing SMS or voice delivery
    SelectCapability,
    /// Reviewing cost against the wallet balance
    Confirm,
    /// Purchase submitted, polling for the code
    AwaitingCode,
    /// Code delivered
    Done,
    /// Cancelled and refunded
    Cancelled,
}

impl Step {
    /// Position in the forward ordering
    fn order(&self) -> u8 {
        match self {
            Step::SelectLocation => 0,
            Step::SelectService => 1,
            Step::SelectCapability => 2,
            Step::Confirm => 3,
            Step::AwaitingCode => 4,
            Step::Done => 5,
            Step::Cancelled => 5,
        }
    }

    /// Whether the session is finished in this step
    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Done | Step::Cancelled)
    }
}

/// Mutable state of one verification purchase, owned by the flow service.
///
/// One session exists per open purchase wizard. All mutation happens through
/// the flow's own handlers; the polling task holds the same session behind a
/// mutex and must re-check the step before acting, since timers are not
/// implicitly invalidated by state transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSession {
    /// Client-side session identifier, for log correlation
    pub id: Uuid,

    /// Current wizard stage
    pub step: Step,

    /// Selected country code
    pub country: Option<String>,

    /// Selected service name
    pub service: Option<String>,

    /// Selected delivery capability
    pub capability: Capability,

    /// Optional carrier filter for the purchase (tier-gated upstream)
    pub carrier: Option<String>,

    /// Optional area-code filter for the purchase (tier-gated upstream)
    pub area_code: Option<String>,

    /// Quoted cost of the purchase; zero until a service is quoted
    pub quoted_cost: Credits,

    /// Server-assigned verification id; set once purchase succeeds and is
    /// the key for all polling, retry, and cancellation calls
    pub verification_id: Option<String>,

    /// The purchased phone number, for display
    pub phone_number: Option<String>,

    /// Uses of the post-timeout retry menu so far
    pub retry_count: u32,

    /// The delivered verification code, once the poll observes it
    pub received_code: Option<String>,

    /// Whether the wallet balance covered the quote on the latest entry
    /// into Confirm; recomputed on every entry, never carried over
    pub balance_ok: bool,

    /// Guard for the single outstanding purchase request
    pub submitting: bool,

    /// Set when the polling ceiling elapsed without a code; enables the
    /// retry menu
    pub timed_out: bool,

    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl VerificationSession {
    /// Create a fresh session at the first wizard stage
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            step: Step::SelectLocation,
            country: None,
            service: None,
            capability: Capability::default(),
            carrier: None,
            area_code: None,
            quoted_cost: Credits::ZERO,
            verification_id: None,
            phone_number: None,
            retry_count: 0,
            received_code: None,
            balance_ok: false,
            submitting: false,
            timed_out: false,
            created_at: Utc::now(),
        }
    }

    /// Reset to the initial state, as when the wizard is closed and reopened
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether a purchase has been submitted for this session
    pub fn has_purchase(&self) -> bool {
        self.verification_id.is_some()
    }

    /// Validate a navigation request to `target`.
    ///
    /// Navigation is forward-only and gated on the prerequisite selection of
    /// the preceding stages. Requesting the current step is valid and the
    /// caller treats it as a no-op. `AwaitingCode`, `Done`, and `Cancelled`
    /// are never navigation targets; they are reached through purchase,
    /// code delivery, and cancellation respectively.
    pub fn validate_navigation(&self, target: Step) -> FlowResult<()> {
        if target == self.step {
            return Ok(());
        }
        if self.step.is_terminal() {
            return Err(FlowError::AlreadyTerminal);
        }
        if matches!(target, Step::AwaitingCode | Step::Done | Step::Cancelled) {
            return Err(FlowError::InvalidTransition {
                from: self.step,
                to: target,
            });
        }
        if target.order() < self.step.order() {
            return Err(FlowError::InvalidTransition {
                from: self.step,
                to: target,
            });
        }
        if target.order() >= Step::SelectService.order() && self.country.is_none() {
            return Err(FlowError::MissingSelection { field: "country" });
        }
        if target.order() >= Step::SelectCapability.order() && self.service.is_none() {
            return Err(FlowError::MissingSelection { field: "service" });
        }
        Ok(())
    }

    /// Record a successful purchase and move to AwaitingCode.
    ///
    /// The server-echoed cost is authoritative and replaces the quote when
    /// they disagree.
    pub fn record_purchase(&mut self, receipt: &PurchaseReceipt) {
        self.verification_id = Some(receipt.id.clone());
        self.phone_number = Some(receipt.phone_number.clone());
        if !receipt.cost.is_zero() {
            self.quoted_cost = receipt.cost;
        }
        self.timed_out = false;
        self.received_code = None;
        self.step = Step::AwaitingCode;
    }
}

impl Default for VerificationSession {
    fn default() -> Self {
        Self::new()
    }
}
