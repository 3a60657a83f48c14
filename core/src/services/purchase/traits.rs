//! Trait seams between the flow and its collaborators

use async_trait::async_trait;

use super::types::{Notification, PurchaseRequest, RetryKind};
use crate::domain::value_objects::{Country, PollUpdate, PriceQuote, PurchaseReceipt, Refund, ServiceOffer};
use crate::errors::FlowResult;
use nr_shared::Credits;

/// The backend verification API
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// List countries numbers can be purchased in
    async fn list_countries(&self) -> FlowResult<Vec<Country>>;

    /// List services available in a country
    async fn list_services(&self, country: &str) -> FlowResult<Vec<ServiceOffer>>;

    /// Quote the price for a service and capability
    async fn quote_price(&self, request: &PurchaseRequest) -> FlowResult<PriceQuote>;

    /// Purchase a verification number
    async fn create_verification(&self, request: &PurchaseRequest) -> FlowResult<PurchaseReceipt>;

    /// Fetch the current status and any delivered messages for a
    /// verification id
    async fn poll_verification(&self, id: &str) -> FlowResult<PollUpdate>;

    /// Cancel a verification and refund its cost
    async fn cancel_verification(&self, id: &str) -> FlowResult<Refund>;

    /// Issue a post-timeout retry against an existing verification
    async fn retry_verification(&self, id: &str, kind: RetryKind) -> FlowResult<PurchaseReceipt>;
}

/// The wallet/balance API
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Fetch the current authoritative balance
    async fn balance(&self) -> FlowResult<Credits>;
}

/// Sink for user-facing events (the toast/notification surface)
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}
