//! Step navigation and purchase submission tests

use std::time::Duration;

use super::mocks::Harness;
use crate::domain::entities::{Capability, Step};
use crate::errors::FlowError;
use crate::services::purchase::types::Notification;
use nr_shared::Credits;

#[tokio::test]
async fn wizard_reaches_confirm_with_quote_and_balance_gate() {
    let h = Harness::new();
    h.to_confirm().await;

    let session = h.flow.session().await;
    assert_eq!(session.step, Step::Confirm);
    assert_eq!(session.quoted_cost, Credits(1.25));
    assert!(session.balance_ok);
    assert_eq!(h.wallet.fetches(), 1);
}

#[tokio::test]
async fn navigating_to_current_step_is_a_noop() {
    let h = Harness::new();
    h.to_confirm().await;
    assert_eq!(h.wallet.fetches(), 1);

    h.flow.go_to_step(Step::Confirm).await.unwrap();

    // No duplicate balance fetch, no state change.
    assert_eq!(h.wallet.fetches(), 1);
    assert_eq!(h.flow.session().await.step, Step::Confirm);
}

#[tokio::test]
async fn service_step_requires_a_country_selection() {
    let h = Harness::new();
    let err = h.flow.go_to_step(Step::SelectService).await.unwrap_err();
    assert!(matches!(err, FlowError::MissingSelection { field: "country" }));
    assert_eq!(h.flow.session().await.step, Step::SelectLocation);
}

#[tokio::test]
async fn voice_capability_requotes_with_premium() {
    let h = Harness::new();
    h.flow.select_country("US").await.unwrap();
    h.flow
        .select_service("telegram", None, None)
        .await
        .unwrap();
    assert_eq!(h.flow.session().await.quoted_cost, Credits(1.25));

    h.flow.select_capability(Capability::Voice).await.unwrap();
    assert_eq!(h.flow.session().await.quoted_cost, Credits(1.75));
}

#[tokio::test]
async fn entering_confirm_with_low_balance_warns_inline() {
    let h = Harness::new();
    h.wallet.set_balance(0.5);
    h.to_confirm().await;

    // Navigation itself succeeds; the warning is inline and submission is
    // gated.
    let session = h.flow.session().await;
    assert_eq!(session.step, Step::Confirm);
    assert!(!session.balance_ok);
    assert_eq!(
        h.sink
            .count_of(|n| matches!(n, Notification::InsufficientBalance { .. })),
        1
    );
}

#[tokio::test]
async fn balance_is_refetched_for_every_submission() {
    let h = Harness::new();
    h.wallet.set_balance(0.5);
    h.to_confirm().await;
    assert_eq!(h.wallet.fetches(), 1);

    let err = h.flow.submit_purchase().await.unwrap_err();
    assert!(matches!(err, FlowError::InsufficientBalance { .. }));
    assert_eq!(h.wallet.fetches(), 2);
    // Rejected before any purchase request went out.
    assert_eq!(h.api.purchases(), 0);

    // A top-up between attempts is honoured because the check is fresh.
    h.wallet.set_balance(10.0);
    h.flow.submit_purchase().await.unwrap();
    assert_eq!(h.wallet.fetches(), 3);
    assert_eq!(h.api.purchases(), 1);
}

#[tokio::test]
async fn successful_purchase_moves_to_awaiting_and_notifies() {
    let h = Harness::new();
    h.to_confirm().await;
    let receipt = h.flow.submit_purchase().await.unwrap();

    let session = h.flow.session().await;
    assert_eq!(session.step, Step::AwaitingCode);
    assert_eq!(session.verification_id.as_deref(), Some("ver-1"));
    assert_eq!(session.quoted_cost, receipt.cost);
    assert!(!session.submitting);

    let events = h.sink.events();
    assert!(events
        .iter()
        .any(|n| matches!(n, Notification::PurchaseCompleted { .. })));
    assert!(events
        .iter()
        .any(|n| matches!(n, Notification::BalanceChanged { .. })));
}

#[tokio::test]
async fn submission_outside_confirm_is_rejected() {
    let h = Harness::new();
    h.flow.select_country("US").await.unwrap();
    let err = h.flow.submit_purchase().await.unwrap_err();
    assert!(matches!(err, FlowError::InvalidTransition { .. }));
    assert_eq!(h.api.purchases(), 0);
}

#[tokio::test]
async fn insufficient_balance_response_stays_on_confirm() {
    let h = Harness::new();
    h.to_confirm().await;
    h.api.script_purchase(Err(FlowError::InsufficientBalance {
        required: Credits(1.25),
        available: Credits(0.0),
    }));

    let err = h.flow.submit_purchase().await.unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
    assert_eq!(h.flow.session().await.step, Step::Confirm);
    assert_eq!(
        h.sink
            .count_of(|n| matches!(n, Notification::InsufficientBalance { .. })),
        1
    );
}

#[tokio::test]
async fn expired_credential_notifies_session_expired() {
    let h = Harness::new();
    h.to_confirm().await;
    h.api.script_purchase(Err(FlowError::AuthExpired));

    let err = h.flow.submit_purchase().await.unwrap_err();
    assert_eq!(err.error_code(), "AUTH_EXPIRED");
    assert_eq!(h.flow.session().await.step, Step::Confirm);
    assert_eq!(
        h.sink.count_of(|n| matches!(n, Notification::SessionExpired)),
        1
    );
}

#[tokio::test]
async fn provider_unavailable_stays_on_confirm_with_failure_toast() {
    let h = Harness::new();
    h.to_confirm().await;
    h.api.script_purchase(Err(FlowError::ProviderUnavailable));

    let err = h.flow.submit_purchase().await.unwrap_err();
    assert_eq!(err.error_code(), "PROVIDER_UNAVAILABLE");
    assert_eq!(h.flow.session().await.step, Step::Confirm);
    assert!(h.sink.events().iter().any(|n| matches!(
        n,
        Notification::PurchaseFailed { message } if message.contains("another service")
    )));
}

#[tokio::test]
async fn generic_server_error_surfaces_server_detail() {
    let h = Harness::new();
    h.to_confirm().await;
    h.api.script_purchase(Err(FlowError::Api {
        status: 500,
        detail: "number pool exhausted".to_string(),
    }));

    let err = h.flow.submit_purchase().await.unwrap_err();
    assert_eq!(err.error_code(), "API_ERROR");
    assert_eq!(h.flow.session().await.step, Step::Confirm);
    assert!(h.sink.events().iter().any(|n| matches!(
        n,
        Notification::PurchaseFailed { message } if message.contains("number pool exhausted")
    )));
}

#[tokio::test]
async fn network_failure_reenables_submission() {
    let h = Harness::new();
    h.to_confirm().await;
    h.api.script_purchase(Err(FlowError::Network {
        message: "timed out".to_string(),
    }));

    let err = h.flow.submit_purchase().await.unwrap_err();
    assert!(err.is_transient());
    let session = h.flow.session().await;
    assert_eq!(session.step, Step::Confirm);
    assert!(!session.submitting);

    // Manual retry goes straight through.
    h.flow.submit_purchase().await.unwrap();
    assert_eq!(h.api.purchases(), 2);
    assert_eq!(h.flow.session().await.step, Step::AwaitingCode);
}

#[tokio::test(start_paused = true)]
async fn closing_the_wizard_resets_state_and_stops_network_activity() {
    let h = Harness::new();
    h.to_awaiting().await;
    tokio::time::sleep(Duration::from_secs(11)).await;
    let polls_before = h.api.polls();
    assert!(polls_before >= 1);

    h.flow.close().await;
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(h.api.polls(), polls_before);
    assert_eq!(h.flow.session().await.step, Step::SelectLocation);
}

#[tokio::test]
async fn reopening_resets_a_finished_session() {
    let h = Harness::new();
    h.to_awaiting().await;
    h.api.script_cancel(Ok(crate::domain::value_objects::Refund {
        refunded: Credits(1.25),
    }));
    h.flow.cancel().await.unwrap();
    assert_eq!(h.flow.session().await.step, Step::Cancelled);

    h.flow.open().await;
    let session = h.flow.session().await;
    assert_eq!(session.step, Step::SelectLocation);
    assert!(session.verification_id.is_none());
    assert_eq!(session.retry_count, 0);
}

#[tokio::test]
async fn selection_setters_enforce_their_stage() {
    let h = Harness::new();
    let err = h
        .flow
        .select_service("telegram", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::InvalidTransition { .. }));

    let err = h.flow.select_capability(Capability::Voice).await.unwrap_err();
    assert!(matches!(err, FlowError::InvalidTransition { .. }));
}
