//! Mock implementations for testing the purchase flow

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::value_objects::{
    Country, PollUpdate, PriceQuote, PurchaseReceipt, Refund, ServiceOffer,
};
use crate::errors::{FlowError, FlowResult};
use crate::services::purchase::traits::{NotificationSink, VerificationApi, WalletApi};
use crate::services::purchase::types::{Notification, PurchaseRequest, RetryKind};
use crate::services::purchase::{PurchaseFlow, PurchaseFlowConfig};
use nr_shared::Credits;

pub fn receipt(id: &str) -> PurchaseReceipt {
    PurchaseReceipt {
        id: id.to_string(),
        phone_number: "+12025550100".to_string(),
        cost: Credits(1.25),
        status: "pending".to_string(),
        remaining_credits: Credits(8.75),
    }
}

pub fn sms_update(message: &str) -> PollUpdate {
    PollUpdate {
        status: "completed".to_string(),
        messages: vec![message.to_string()],
        transcription: None,
    }
}

pub fn voice_update(transcription: &str) -> PollUpdate {
    PollUpdate {
        status: "completed".to_string(),
        messages: Vec::new(),
        transcription: Some(transcription.to_string()),
    }
}

fn network_error() -> FlowError {
    FlowError::Network {
        message: "connection reset".to_string(),
    }
}

/// Scripted backend API. Response queues are consumed per call; when a
/// queue runs dry the default response applies (successful purchase,
/// empty poll, successful refund).
pub struct MockApi {
    pub purchase_responses: Mutex<VecDeque<FlowResult<PurchaseReceipt>>>,
    pub poll_responses: Mutex<VecDeque<FlowResult<PollUpdate>>>,
    pub retry_responses: Mutex<VecDeque<FlowResult<PurchaseReceipt>>>,
    pub cancel_responses: Mutex<VecDeque<FlowResult<Refund>>>,
    pub purchase_calls: AtomicU32,
    pub poll_calls: AtomicU32,
    pub retry_calls: AtomicU32,
    pub cancel_calls: AtomicU32,
    pub retry_kinds: Mutex<Vec<RetryKind>>,
    /// Elapsed offsets of each poll call since mock creation, for
    /// cadence assertions under a paused clock
    pub poll_ticks: Mutex<Vec<Duration>>,
    started: Instant,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            purchase_responses: Mutex::new(VecDeque::new()),
            poll_responses: Mutex::new(VecDeque::new()),
            retry_responses: Mutex::new(VecDeque::new()),
            cancel_responses: Mutex::new(VecDeque::new()),
            purchase_calls: AtomicU32::new(0),
            poll_calls: AtomicU32::new(0),
            retry_calls: AtomicU32::new(0),
            cancel_calls: AtomicU32::new(0),
            retry_kinds: Mutex::new(Vec::new()),
            poll_ticks: Mutex::new(Vec::new()),
            started: Instant::now(),
        }
    }

    pub fn script_purchase(&self, response: FlowResult<PurchaseReceipt>) {
        self.purchase_responses.lock().unwrap().push_back(response);
    }

    pub fn script_poll(&self, response: FlowResult<PollUpdate>) {
        self.poll_responses.lock().unwrap().push_back(response);
    }

    pub fn script_retry(&self, response: FlowResult<PurchaseReceipt>) {
        self.retry_responses.lock().unwrap().push_back(response);
    }

    pub fn script_cancel(&self, response: FlowResult<Refund>) {
        self.cancel_responses.lock().unwrap().push_back(response);
    }

    pub fn polls(&self) -> u32 {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn purchases(&self) -> u32 {
        self.purchase_calls.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> u32 {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    pub fn retries(&self) -> u32 {
        self.retry_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VerificationApi for MockApi {
    async fn list_countries(&self) -> FlowResult<Vec<Country>> {
        Ok(vec![
            Country {
                code: "US".to_string(),
                name: "United States".to_string(),
            },
            Country {
                code: "GB".to_string(),
                name: "United Kingdom".to_string(),
            },
        ])
    }

    async fn list_services(&self, _country: &str) -> FlowResult<Vec<ServiceOffer>> {
        Ok(vec![ServiceOffer {
            name: "telegram".to_string(),
            cost: Credits(1.25),
        }])
    }

    async fn quote_price(&self, _request: &PurchaseRequest) -> FlowResult<PriceQuote> {
        Ok(PriceQuote {
            base_price: Credits(1.25),
            voice_premium: Some(Credits(0.5)),
        })
    }

    async fn create_verification(&self, _request: &PurchaseRequest) -> FlowResult<PurchaseReceipt> {
        self.purchase_calls.fetch_add(1, Ordering::SeqCst);
        self.purchase_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(receipt("ver-1")))
    }

    async fn poll_verification(&self, _id: &str) -> FlowResult<PollUpdate> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        self.poll_ticks.lock().unwrap().push(self.started.elapsed());
        self.poll_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PollUpdate::default()))
    }

    async fn cancel_verification(&self, _id: &str) -> FlowResult<Refund> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        self.cancel_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(Refund {
                    refunded: Credits(1.25),
                })
            })
    }

    async fn retry_verification(&self, _id: &str, kind: RetryKind) -> FlowResult<PurchaseReceipt> {
        self.retry_calls.fetch_add(1, Ordering::SeqCst);
        self.retry_kinds.lock().unwrap().push(kind);
        self.retry_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(receipt("ver-retry")))
    }
}

/// Wallet with a settable balance and call counter
pub struct MockWallet {
    pub balance: Mutex<Credits>,
    pub calls: AtomicU32,
    pub fail: AtomicBool,
}

impl MockWallet {
    pub fn with_balance(balance: f64) -> Self {
        Self {
            balance: Mutex::new(Credits(balance)),
            calls: AtomicU32::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_balance(&self, balance: f64) {
        *self.balance.lock().unwrap() = Credits(balance);
    }

    pub fn fetches(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletApi for MockWallet {
    async fn balance(&self) -> FlowResult<Credits> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(network_error());
        }
        Ok(*self.balance.lock().unwrap())
    }
}

/// Notification sink that records every event
pub struct RecordingSink {
    pub events: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().unwrap().clone()
    }

    pub fn count_of(&self, predicate: impl Fn(&Notification) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|n| predicate(n)).count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.events.lock().unwrap().push(notification);
    }
}

/// Flow wired to fresh mocks
pub struct Harness {
    pub api: Arc<MockApi>,
    pub wallet: Arc<MockWallet>,
    pub sink: Arc<RecordingSink>,
    pub flow: PurchaseFlow<MockApi, MockWallet, RecordingSink>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PurchaseFlowConfig::default())
    }

    pub fn with_config(config: PurchaseFlowConfig) -> Self {
        let api = Arc::new(MockApi::new());
        let wallet = Arc::new(MockWallet::with_balance(10.0));
        let sink = Arc::new(RecordingSink::new());
        let flow = PurchaseFlow::new(
            Arc::clone(&api),
            Arc::clone(&wallet),
            Arc::clone(&sink),
            config,
        );
        Self {
            api,
            wallet,
            sink,
            flow,
        }
    }

    /// Drive the wizard to the confirm step with default selections
    pub async fn to_confirm(&self) {
        self.flow.select_country("US").await.unwrap();
        self.flow
            .select_service("telegram", None, None)
            .await
            .unwrap();
        self.flow
            .go_to_step(crate::domain::entities::Step::Confirm)
            .await
            .unwrap();
    }

    /// Drive the wizard through a successful purchase into AwaitingCode
    pub async fn to_awaiting(&self) {
        self.to_confirm().await;
        self.flow.submit_purchase().await.unwrap();
    }
}
