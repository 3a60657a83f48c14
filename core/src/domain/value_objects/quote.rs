//! Price quotes for a service and capability

use serde::{Deserialize, Serialize};

use crate::domain::entities::Capability;
use nr_shared::Credits;

/// A price quote returned by the pricing endpoint prior to purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Base price for SMS delivery
    pub base_price: Credits,
    /// Surcharge applied when the code is delivered by voice call
    pub voice_premium: Option<Credits>,
}

impl PriceQuote {
    /// Total cost for the given delivery capability
    pub fn total(&self, capability: Capability) -> Credits {
        match capability {
            Capability::Sms => self.base_price,
            Capability::Voice => self.base_price + self.voice_premium.unwrap_or(Credits::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_total_adds_premium() {
        let quote = PriceQuote {
            base_price: Credits(1.0),
            voice_premium: Some(Credits(0.5)),
        };
        assert_eq!(quote.total(Capability::Sms), Credits(1.0));
        assert_eq!(quote.total(Capability::Voice), Credits(1.5));
    }

    #[test]
    fn missing_premium_means_no_surcharge() {
        let quote = PriceQuote {
            base_price: Credits(2.0),
            voice_premium: None,
        };
        assert_eq!(quote.total(Capability::Voice), Credits(2.0));
    }
}
