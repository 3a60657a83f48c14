//! Configuration for the purchase flow

use std::time::Duration;

use crate::domain::entities::{Capability, DEFAULT_MAX_RETRIES};
use nr_shared::{FlowConfig, PollCadence};

/// Configuration for the purchase flow service
#[derive(Debug, Clone)]
pub struct PurchaseFlowConfig {
    /// Maximum uses of the post-timeout retry menu
    pub max_retries: u32,
    /// Absolute polling ceiling for SMS deliveries
    pub sms_timeout: Duration,
    /// Absolute polling ceiling for voice deliveries
    pub voice_timeout: Duration,
    /// Boundary between the early and mid cadence tiers
    pub early_threshold: Duration,
    /// Boundary between the mid and late cadence tiers
    pub late_threshold: Duration,
    /// Poll cadence for SMS deliveries
    pub sms_cadence: PollCadence,
    /// Poll cadence for voice deliveries
    pub voice_cadence: PollCadence,
}

impl PurchaseFlowConfig {
    /// Absolute polling ceiling for the given capability
    pub fn timeout_for(&self, capability: Capability) -> Duration {
        match capability {
            Capability::Sms => self.sms_timeout,
            Capability::Voice => self.voice_timeout,
        }
    }

    /// Cadence table for the given capability
    pub fn cadence_for(&self, capability: Capability) -> PollCadence {
        match capability {
            Capability::Sms => self.sms_cadence,
            Capability::Voice => self.voice_cadence,
        }
    }
}

impl From<FlowConfig> for PurchaseFlowConfig {
    fn from(config: FlowConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            sms_timeout: Duration::from_secs(config.sms_timeout_secs),
            voice_timeout: Duration::from_secs(config.voice_timeout_secs),
            early_threshold: Duration::from_secs(config.early_threshold_secs),
            late_threshold: Duration::from_secs(config.late_threshold_secs),
            sms_cadence: config.sms_cadence,
            voice_cadence: config.voice_cadence,
        }
    }
}

impl Default for PurchaseFlowConfig {
    fn default() -> Self {
        let config = Self::from(FlowConfig::default());
        debug_assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        config
    }
}
