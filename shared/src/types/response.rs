//! Error payload shape returned by the backend API

use serde::{Deserialize, Serialize};

/// Error body returned by the backend on non-2xx responses.
///
/// The backend is not guaranteed to include a body on every failure, so the
/// detail defaults to empty and callers substitute a generic message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable failure detail from the server
    #[serde(default)]
    pub detail: String,
}

impl ApiErrorBody {
    /// The server detail, or the given fallback when the body was empty
    pub fn detail_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.detail.is_empty() {
            fallback
        } else {
            &self.detail
        }
    }
}
