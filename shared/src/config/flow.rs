//! Purchase-flow tuning configuration
//!
//! Every timing and retry value here differed across variants of the
//! original product, so all of them are configuration with defaults taken
//! from the most complete variant.

use serde::{Deserialize, Serialize};

/// Poll intervals (seconds) for one delivery capability, by elapsed time
/// since purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollCadence {
    /// Interval while elapsed time is below the early threshold
    pub early_secs: u64,
    /// Interval between the early and late thresholds
    pub mid_secs: u64,
    /// Interval once past the late threshold
    pub late_secs: u64,
}

/// Configuration for the verification purchase flow
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Maximum uses of the post-timeout retry menu per session
    pub max_retries: u32,

    /// Absolute polling ceiling for SMS deliveries, in seconds
    pub sms_timeout_secs: u64,

    /// Absolute polling ceiling for voice deliveries, in seconds
    pub voice_timeout_secs: u64,

    /// Elapsed-time boundary between the early and mid cadence tiers
    pub early_threshold_secs: u64,

    /// Elapsed-time boundary between the mid and late cadence tiers
    pub late_threshold_secs: u64,

    /// Poll cadence for SMS deliveries
    pub sms_cadence: PollCadence,

    /// Poll cadence for voice deliveries
    pub voice_cadence: PollCadence,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            sms_timeout_secs: 300,
            voice_timeout_secs: 330,
            early_threshold_secs: 30,
            late_threshold_secs: 60,
            sms_cadence: PollCadence {
                early_secs: 5,
                mid_secs: 8,
                late_secs: 10,
            },
            voice_cadence: PollCadence {
                early_secs: 3,
                mid_secs: 5,
                late_secs: 10,
            },
        }
    }
}

impl FlowConfig {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_retries: env_parse("NUMRELAY_FLOW_MAX_RETRIES", defaults.max_retries),
            sms_timeout_secs: env_parse("NUMRELAY_FLOW_SMS_TIMEOUT_SECS", defaults.sms_timeout_secs),
            voice_timeout_secs: env_parse(
                "NUMRELAY_FLOW_VOICE_TIMEOUT_SECS",
                defaults.voice_timeout_secs,
            ),
            ..defaults
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
