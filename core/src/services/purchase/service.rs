//! Purchase flow service implementation

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use super::config::PurchaseFlowConfig;
use super::polling::{spawn_poller, PollHandle};
use super::traits::{NotificationSink, VerificationApi, WalletApi};
use super::types::{Notification, PurchaseRequest, RetryKind, RetryMenuOption};
use crate::domain::entities::{Capability, Step, VerificationSession};
use crate::domain::value_objects::{Country, PurchaseReceipt, Refund, ServiceOffer};
use crate::errors::{FlowError, FlowResult};
use nr_shared::Credits;

/// Drives one verification purchase session against the backend API.
///
/// The session record is owned here and mutated only by this service's
/// handlers and its polling task; the surrounding front end observes it
/// through [`PurchaseFlow::session`] snapshots and the notification sink.
/// At most one polling task exists per session, and arming a new one always
/// tears the previous one down first.
pub struct PurchaseFlow<A, W, N>
where
    A: VerificationApi + 'static,
    W: WalletApi,
    N: NotificationSink + 'static,
{
    /// Backend verification API
    api: Arc<A>,
    /// Wallet/balance API
    wallet: Arc<W>,
    /// User-facing notification surface
    sink: Arc<N>,
    /// Flow configuration
    config: PurchaseFlowConfig,
    /// The session record, shared with the polling task
    session: Arc<Mutex<VerificationSession>>,
    /// Active polling task, at most one
    poll: Mutex<Option<PollHandle>>,
}

impl<A, W, N> PurchaseFlow<A, W, N>
where
    A: VerificationApi + 'static,
    W: WalletApi,
    N: NotificationSink + 'static,
{
    /// Create a flow with a fresh session
    pub fn new(api: Arc<A>, wallet: Arc<W>, sink: Arc<N>, config: PurchaseFlowConfig) -> Self {
        Self {
            api,
            wallet,
            sink,
            config,
            session: Arc::new(Mutex::new(VerificationSession::new())),
            poll: Mutex::new(None),
        }
    }

    /// Snapshot of the current session state
    pub async fn session(&self) -> VerificationSession {
        self.session.lock().await.clone()
    }

    /// Reset for a new purchase, as when the wizard is (re)opened.
    ///
    /// Any previous session's polling task is cancelled before the state is
    /// cleared, so a stale timer can never outlive its session.
    pub async fn open(&self) {
        self.stop_polling().await;
        let mut session = self.session.lock().await;
        session.reset();
        info!(session_id = %session.id, event = "session_opened", "Purchase session opened");
    }

    /// Tear down when the wizard closes: polling stops and the session is
    /// destroyed. No network calls are made on behalf of the session after
    /// this returns.
    pub async fn close(&self) {
        self.stop_polling().await;
        let mut session = self.session.lock().await;
        info!(session_id = %session.id, event = "session_closed", "Purchase session closed");
        session.reset();
    }

    /// Countries available for purchase
    pub async fn list_countries(&self) -> FlowResult<Vec<Country>> {
        self.api.list_countries().await
    }

    /// Services available in the selected country
    pub async fn list_services(&self) -> FlowResult<Vec<ServiceOffer>> {
        let country = {
            let session = self.session.lock().await;
            session
                .country
                .clone()
                .ok_or(FlowError::MissingSelection { field: "country" })?
        };
        self.api.list_services(&country).await
    }

    /// Select the country and advance to service selection
    pub async fn select_country(&self, code: impl Into<String>) -> FlowResult<()> {
        let mut session = self.session.lock().await;
        if session.step != Step::SelectLocation {
            return Err(FlowError::InvalidTransition {
                from: session.step,
                to: Step::SelectLocation,
            });
        }
        session.country = Some(code.into());
        session.step = Step::SelectService;
        Ok(())
    }

    /// Select the service, fetch its quote, and advance to capability
    /// selection. Optional carrier/area-code filters apply to both the
    /// quote and the eventual purchase.
    pub async fn select_service(
        &self,
        name: impl Into<String>,
        carrier: Option<String>,
        area_code: Option<String>,
    ) -> FlowResult<()> {
        let mut session = self.session.lock().await;
        if session.step != Step::SelectService {
            return Err(FlowError::InvalidTransition {
                from: session.step,
                to: Step::SelectService,
            });
        }
        session.service = Some(name.into());
        session.carrier = carrier;
        session.area_code = area_code;

        let request = Self::request_from(&session)?;
        let quote = self.api.quote_price(&request).await?;
        session.quoted_cost = quote.total(session.capability);
        session.step = Step::SelectCapability;
        Ok(())
    }

    /// Select the delivery capability and refresh the quote, since voice
    /// delivery may carry a premium
    pub async fn select_capability(&self, capability: Capability) -> FlowResult<()> {
        let mut session = self.session.lock().await;
        if session.step != Step::SelectCapability {
            return Err(FlowError::InvalidTransition {
                from: session.step,
                to: Step::SelectCapability,
            });
        }
        session.capability = capability;
        let request = Self::request_from(&session)?;
        let quote = self.api.quote_price(&request).await?;
        session.quoted_cost = quote.total(capability);
        Ok(())
    }

    /// Navigate the wizard to `target`.
    ///
    /// Requesting the current step is a no-op with no network calls.
    /// Navigation is forward-only and rejects any target whose prerequisite
    /// selection is missing, naming the missing field. Entering Confirm
    /// fetches a fresh wallet balance and compares it against the quote;
    /// an insufficient balance is an inline warning, not a navigation
    /// failure, and disables submission until it is re-checked.
    pub async fn go_to_step(&self, target: Step) -> FlowResult<()> {
        let mut session = self.session.lock().await;
        session.validate_navigation(target)?;
        if session.step == target {
            return Ok(());
        }
        session.step = target;
        if target == Step::Confirm {
            self.refresh_balance_gate(&mut session).await?;
        }
        Ok(())
    }

    /// Submit the purchase. A single request may be outstanding at a time;
    /// the quote is re-validated against a fresh balance immediately before
    /// submission, every time.
    pub async fn submit_purchase(&self) -> FlowResult<PurchaseReceipt> {
        let request = {
            let mut session = self.session.lock().await;
            if session.step != Step::Confirm {
                return Err(FlowError::InvalidTransition {
                    from: session.step,
                    to: Step::AwaitingCode,
                });
            }
            if session.submitting {
                return Err(FlowError::PurchaseInFlight);
            }
            let request = Self::request_from(&session)?;
            session.submitting = true;
            request
        };

        let result = self.checked_purchase(&request).await;

        let mut session = self.session.lock().await;
        session.submitting = false;
        match result {
            Ok(receipt) => {
                session.record_purchase(&receipt);
                info!(
                    session_id = %session.id,
                    verification_id = %receipt.id,
                    cost = %receipt.cost,
                    event = "purchase_completed",
                    "Verification purchased"
                );
                let capability = session.capability;
                let verification_id = receipt.id.clone();
                drop(session);

                self.restart_polling(verification_id, capability).await;
                self.sink.notify(Notification::PurchaseCompleted {
                    verification_id: receipt.id.clone(),
                    phone_number: receipt.phone_number.clone(),
                    cost: receipt.cost,
                });
                self.sink.notify(Notification::BalanceChanged {
                    balance: receipt.remaining_credits,
                });
                Ok(receipt)
            }
            Err(err) => {
                warn!(
                    session_id = %session.id,
                    error_code = err.error_code(),
                    error = %err,
                    event = "purchase_failed",
                    "Purchase submission failed"
                );
                drop(session);
                self.notify_purchase_failure(&err);
                Err(err)
            }
        }
    }

    /// Entries of the post-timeout retry menu currently available.
    ///
    /// Once the retry allowance is exhausted, only cancellation remains.
    pub async fn retry_options(&self) -> Vec<RetryMenuOption> {
        let session = self.session.lock().await;
        if session.retry_count >= self.config.max_retries {
            vec![RetryMenuOption::CancelAndRefund]
        } else {
            vec![
                RetryMenuOption::SwitchCapability,
                RetryMenuOption::SameNumber,
                RetryMenuOption::NewNumber,
                RetryMenuOption::CancelAndRefund,
            ]
        }
    }

    /// Take a retry action from the post-timeout menu.
    ///
    /// Only available after polling timed out, and each use consumes one
    /// unit of the retry allowance. On success the session returns to
    /// AwaitingCode with polling restarted, under the new capability's
    /// cadence when the capability was switched.
    pub async fn retry(&self, kind: RetryKind) -> FlowResult<()> {
        let (verification_id, capability) = {
            let session = self.session.lock().await;
            if session.step != Step::AwaitingCode {
                return Err(FlowError::AlreadyTerminal);
            }
            if !session.timed_out {
                return Err(FlowError::RetryNotAvailable);
            }
            if session.retry_count >= self.config.max_retries {
                return Err(FlowError::MaxRetriesExceeded);
            }
            let id = session
                .verification_id
                .clone()
                .ok_or(FlowError::RetryNotAvailable)?;
            (id, session.capability)
        };

        match kind {
            RetryKind::SameNumber => {
                let mut session = self.session.lock().await;
                session.retry_count += 1;
                session.timed_out = false;
                info!(
                    session_id = %session.id,
                    verification_id = %verification_id,
                    retry_count = session.retry_count,
                    event = "retry_same_number",
                    "Re-arming polling on the same number"
                );
                drop(session);
                self.restart_polling(verification_id, capability).await;
            }
            RetryKind::SwitchCapability => {
                let receipt = self.api.retry_verification(&verification_id, kind).await?;
                let mut session = self.session.lock().await;
                session.retry_count += 1;
                session.capability = capability.toggled();
                session.record_purchase(&receipt);
                info!(
                    session_id = %session.id,
                    verification_id = %receipt.id,
                    capability = session.capability.as_str(),
                    retry_count = session.retry_count,
                    event = "retry_switch_capability",
                    "Retrying with switched capability"
                );
                let new_capability = session.capability;
                drop(session);
                self.restart_polling(receipt.id.clone(), new_capability).await;
                self.sink.notify(Notification::BalanceChanged {
                    balance: receipt.remaining_credits,
                });
            }
            RetryKind::NewNumber => {
                let receipt = self.api.retry_verification(&verification_id, kind).await?;
                let mut session = self.session.lock().await;
                session.retry_count += 1;
                session.record_purchase(&receipt);
                info!(
                    session_id = %session.id,
                    verification_id = %receipt.id,
                    retry_count = session.retry_count,
                    event = "retry_new_number",
                    "Retrying with a fresh number"
                );
                drop(session);
                self.restart_polling(receipt.id.clone(), capability).await;
                self.sink.notify(Notification::BalanceChanged {
                    balance: receipt.remaining_credits,
                });
            }
        }
        Ok(())
    }

    /// Cancel the verification and refund its cost.
    ///
    /// The front end must confirm this with the user first; it is
    /// destructive. A failed cancellation call leaves the session awaiting
    /// its code with polling still active, and is not retried implicitly.
    /// Cancelling an already-finished session is rejected locally without a
    /// network call.
    pub async fn cancel(&self) -> FlowResult<Refund> {
        let verification_id = {
            let session = self.session.lock().await;
            if session.step.is_terminal() {
                return Err(FlowError::AlreadyTerminal);
            }
            session
                .verification_id
                .clone()
                .ok_or(FlowError::InvalidTransition {
                    from: session.step,
                    to: Step::Cancelled,
                })?
        };

        let refund = self.api.cancel_verification(&verification_id).await?;

        self.stop_polling().await;
        let mut session = self.session.lock().await;
        session.step = Step::Cancelled;
        info!(
            session_id = %session.id,
            verification_id = %verification_id,
            refunded = %refund.refunded,
            event = "verification_cancelled",
            "Verification cancelled and refunded"
        );
        drop(session);

        self.sink.notify(Notification::RefundIssued {
            amount: refund.refunded,
        });
        if let Ok(balance) = self.wallet.balance().await {
            self.sink.notify(Notification::BalanceChanged { balance });
        }
        Ok(refund)
    }

    /// Fetch a fresh balance and submit the purchase only when it covers
    /// the quote
    async fn checked_purchase(&self, request: &PurchaseRequest) -> FlowResult<PurchaseReceipt> {
        let balance = self.wallet.balance().await?;
        let quoted = {
            let mut session = self.session.lock().await;
            session.balance_ok = balance.covers(session.quoted_cost);
            session.quoted_cost
        };
        if !balance.covers(quoted) {
            return Err(FlowError::InsufficientBalance {
                required: quoted,
                available: balance,
            });
        }
        self.api.create_verification(request).await
    }

    /// Recompute the Confirm-step balance gate from a fresh fetch
    async fn refresh_balance_gate(&self, session: &mut VerificationSession) -> FlowResult<()> {
        match self.wallet.balance().await {
            Ok(balance) => {
                session.balance_ok = balance.covers(session.quoted_cost);
                if !session.balance_ok {
                    self.sink.notify(Notification::InsufficientBalance {
                        required: session.quoted_cost,
                        available: balance,
                    });
                }
                Ok(())
            }
            Err(err) => {
                // Without a fresh balance the gate stays closed.
                session.balance_ok = false;
                Err(err)
            }
        }
    }

    /// Replace the active polling task, tearing down any previous one
    async fn restart_polling(&self, verification_id: String, capability: Capability) {
        let mut poll = self.poll.lock().await;
        if let Some(previous) = poll.take() {
            previous.cancel();
        }
        *poll = Some(spawn_poller(
            Arc::clone(&self.api),
            Arc::clone(&self.sink),
            Arc::clone(&self.session),
            self.config.clone(),
            verification_id,
            capability,
        ));
    }

    /// Cancel and drop the active polling task, if any. Safe to call at
    /// any time.
    async fn stop_polling(&self) {
        let mut poll = self.poll.lock().await;
        if let Some(handle) = poll.take() {
            handle.cancel();
        }
    }

    /// Convert the flow's notification out of a purchase failure
    fn notify_purchase_failure(&self, err: &FlowError) {
        match err {
            FlowError::AuthExpired => self.sink.notify(Notification::SessionExpired),
            FlowError::InsufficientBalance {
                required,
                available,
            } => self.sink.notify(Notification::InsufficientBalance {
                required: *required,
                available: *available,
            }),
            other => self.sink.notify(Notification::PurchaseFailed {
                message: other.to_string(),
            }),
        }
    }

    /// Build the quote/purchase request from the session's selections
    fn request_from(session: &VerificationSession) -> FlowResult<PurchaseRequest> {
        let country = session
            .country
            .clone()
            .ok_or(FlowError::MissingSelection { field: "country" })?;
        let service = session
            .service
            .clone()
            .ok_or(FlowError::MissingSelection { field: "service" })?;
        Ok(PurchaseRequest {
            country,
            service,
            capability: session.capability,
            carrier: session.carrier.clone(),
            area_code: session.area_code.clone(),
        })
    }

    /// The configured retry allowance, for surfacing in menus
    pub fn max_retries(&self) -> u32 {
        self.config.max_retries
    }

    /// Balance snapshot straight from the wallet API
    pub async fn balance(&self) -> FlowResult<Credits> {
        self.wallet.balance().await
    }
}
