//! Wallet credit amounts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A wallet credit amount as reported by the backend.
///
/// The backend is the single source of truth for balances; this type only
/// carries the value around and compares it against quoted costs, it never
/// does client-side bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credits(pub f64);

impl Credits {
    pub const ZERO: Credits = Credits(0.0);

    /// Whether this balance covers the given cost
    pub fn covers(&self, cost: Credits) -> bool {
        self.0 >= cost.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Credits {
    type Output = Credits;

    fn add(self, rhs: Credits) -> Credits {
        Credits(self.0 + rhs.0)
    }
}

impl Sub for Credits {
    type Output = Credits;

    fn sub(self, rhs: Credits) -> Credits {
        Credits(self.0 - rhs.0)
    }
}

impl From<f64> for Credits {
    fn from(value: f64) -> Self {
        Credits(value)
    }
}
