//! Country and service listings for the selection steps

use serde::{Deserialize, Serialize};

use nr_shared::Credits;

/// A country a verification number can be purchased in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Country code, e.g. "US"
    pub code: String,
    /// Display name
    pub name: String,
}

/// A service a verification code can be received for, with its listed cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffer {
    /// Service name, e.g. "telegram"
    pub name: String,
    /// Listed SMS cost in wallet credits
    pub cost: Credits,
}
