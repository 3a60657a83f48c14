//! Polling status updates

use serde::{Deserialize, Serialize};

use crate::domain::entities::Capability;

/// One status/message fetch for a verification id.
///
/// Missing fields default to empty at the API boundary, so the delivery
/// check here never has to reason about absent data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollUpdate {
    /// Verification status reported by the backend
    pub status: String,
    /// SMS messages received so far
    pub messages: Vec<String>,
    /// Voice call transcription, if one was made
    pub transcription: Option<String>,
}

impl PollUpdate {
    /// The delivered text to extract a code from, if delivery happened.
    ///
    /// SMS delivery means at least one message; voice delivery means a
    /// non-empty transcription.
    pub fn delivered_text(&self, capability: Capability) -> Option<&str> {
        match capability {
            Capability::Sms => self.messages.first().map(String::as_str),
            Capability::Voice => self
                .transcription
                .as_deref()
                .filter(|t| !t.trim().is_empty()),
        }
    }
}
