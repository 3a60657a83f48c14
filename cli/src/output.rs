//! Terminal rendering of flow notifications (the toast surface)

use nr_core::services::purchase::{Notification, NotificationSink};

pub struct TerminalSink;

impl TerminalSink {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for TerminalSink {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::PurchaseCompleted {
                phone_number, cost, ..
            } => {
                println!("✔ Purchased {} for {} credits, waiting for the code...", phone_number, cost);
            }
            Notification::PurchaseFailed { message } => {
                println!("✘ Purchase failed: {}", message);
            }
            Notification::CodeReceived { code } => {
                println!("✔ Code received: {}", code);
            }
            Notification::StillWaiting { elapsed_secs } => {
                println!("… still waiting ({}s elapsed)", elapsed_secs);
            }
            Notification::PollTimedOut => {
                println!("! No code arrived in time.");
            }
            Notification::RefundIssued { amount } => {
                println!("✔ Refunded {} credits", amount);
            }
            Notification::BalanceChanged { balance } => {
                println!("  Balance: {} credits", balance);
            }
            Notification::SessionExpired => {
                println!("✘ Session expired, please log in again.");
            }
            Notification::InsufficientBalance {
                required,
                available,
            } => {
                println!(
                    "! Insufficient balance: this costs {} credits but you have {}. Top up to continue.",
                    required, available
                );
            }
        }
    }
}
