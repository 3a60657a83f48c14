//! Purchase and refund results

use serde::{Deserialize, Serialize};

use nr_shared::Credits;

/// The backend's response to a successful purchase (or new-number retry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// Server-assigned verification id
    pub id: String,
    /// The purchased phone number
    pub phone_number: String,
    /// Authoritative cost charged, in wallet credits
    pub cost: Credits,
    /// Initial verification status
    pub status: String,
    /// Wallet balance after the charge
    pub remaining_credits: Credits,
}

/// The backend's response to a cancellation request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    /// Amount returned to the wallet
    pub refunded: Credits,
}
