//! Code polling loop
//!
//! One background task per session drives AwaitingCode to Done. The task is
//! strictly sequential: it sleeps for the adaptive interval, issues one
//! status fetch, and only then schedules the next tick, so tick N+1 is never
//! in flight before tick N's response is observed. An absolute deadline
//! wraps the whole loop; a tick still in flight when the deadline fires is
//! abandoned with it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::config::PurchaseFlowConfig;
use super::traits::{NotificationSink, VerificationApi};
use super::types::Notification;
use crate::domain::entities::{Capability, Step, VerificationSession};
use nr_shared::utils::code::extract_code;

/// Handle to a session's active polling task.
///
/// `cancel` is always safe to call, including twice and after the task has
/// already finished. Dropping the handle cancels the task, so replacing a
/// session's handle tears the previous poller down.
#[derive(Debug)]
pub struct PollHandle {
    abort: AbortHandle,
}

impl PollHandle {
    fn new(abort: AbortHandle) -> Self {
        Self { abort }
    }

    /// Stop the polling task. Idempotent.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Whether the task has finished or been cancelled
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Adaptive poll interval for the given capability and elapsed time since
/// purchase.
///
/// Codes are most likely to arrive shortly after purchase, so polling is
/// fastest early and backs off as time passes. Voice codes tend to arrive
/// faster than SMS and poll more aggressively at first.
pub fn poll_interval(
    config: &PurchaseFlowConfig,
    capability: Capability,
    elapsed: Duration,
) -> Duration {
    let cadence = config.cadence_for(capability);
    let secs = if elapsed < config.early_threshold {
        cadence.early_secs
    } else if elapsed < config.late_threshold {
        cadence.mid_secs
    } else {
        cadence.late_secs
    };
    Duration::from_secs(secs)
}

/// Cadence tier index for the elapsed time, used to announce backoff
/// transitions at most once each
fn cadence_tier(config: &PurchaseFlowConfig, elapsed: Duration) -> u8 {
    if elapsed < config.early_threshold {
        0
    } else if elapsed < config.late_threshold {
        1
    } else {
        2
    }
}

/// Spawn the polling task for a session.
///
/// The task holds the session behind its mutex and re-checks the step
/// before every mutation: cancellation and timeout are cooperative, and a
/// callback that fires after the session moved to a terminal state must
/// no-op rather than resurrect it.
pub(crate) fn spawn_poller<A, N>(
    api: Arc<A>,
    sink: Arc<N>,
    session: Arc<Mutex<VerificationSession>>,
    config: PurchaseFlowConfig,
    verification_id: String,
    capability: Capability,
) -> PollHandle
where
    A: VerificationApi + 'static,
    N: NotificationSink + 'static,
{
    let handle = tokio::spawn(async move {
        let started = Instant::now();
        let deadline = started + config.timeout_for(capability);

        debug!(
            verification_id = %verification_id,
            capability = capability.as_str(),
            event = "poll_started",
            "Polling for verification code"
        );

        let delivered = tokio::time::timeout_at(
            deadline,
            run_ticks(&*api, &*sink, &config, &verification_id, capability, started),
        )
        .await;

        match delivered {
            Ok(text) => {
                let code = extract_code(&text);
                let mut guard = session.lock().await;
                if guard.step != Step::AwaitingCode {
                    return;
                }
                info!(
                    session_id = %guard.id,
                    verification_id = %verification_id,
                    event = "code_received",
                    "Verification code delivered"
                );
                guard.received_code = Some(code.clone());
                guard.step = Step::Done;
                drop(guard);
                sink.notify(Notification::CodeReceived { code });
            }
            Err(_elapsed) => {
                let mut guard = session.lock().await;
                if guard.step != Step::AwaitingCode || guard.timed_out {
                    return;
                }
                warn!(
                    session_id = %guard.id,
                    verification_id = %verification_id,
                    event = "poll_timeout",
                    "No code before the polling deadline, offering retry menu"
                );
                guard.timed_out = true;
                drop(guard);
                sink.notify(Notification::PollTimedOut);
            }
        }
    });

    PollHandle::new(handle.abort_handle())
}

/// Tick until a code is delivered. Transient fetch failures are logged and
/// the next tick proceeds on schedule; only delivery ends the loop (the
/// caller's deadline ends it otherwise).
async fn run_ticks<A, N>(
    api: &A,
    sink: &N,
    config: &PurchaseFlowConfig,
    verification_id: &str,
    capability: Capability,
    started: Instant,
) -> String
where
    A: VerificationApi,
    N: NotificationSink,
{
    let mut announced_tier = 0u8;
    loop {
        let interval = poll_interval(config, capability, started.elapsed());
        tokio::time::sleep(interval).await;

        match api.poll_verification(verification_id).await {
            Ok(update) => {
                if let Some(text) = update.delivered_text(capability) {
                    return text.to_string();
                }
                let elapsed = started.elapsed();
                let tier = cadence_tier(config, elapsed);
                if tier > announced_tier {
                    announced_tier = tier;
                    sink.notify(Notification::StillWaiting {
                        elapsed_secs: elapsed.as_secs(),
                    });
                }
                debug!(
                    verification_id = %verification_id,
                    status = %update.status,
                    event = "poll_empty",
                    "No code yet"
                );
            }
            Err(e) => {
                warn!(
                    verification_id = %verification_id,
                    error = %e,
                    event = "poll_tick_failed",
                    "Poll tick failed, continuing on schedule"
                );
            }
        }
    }
}
