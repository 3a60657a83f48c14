//! Verification-code extraction from delivered message text

use once_cell::sync::Lazy;
use regex::Regex;

// Verification codes are 4-8 digit runs embedded in free-form message text.
static CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4,8}").unwrap());

/// Extract the verification code from a delivered SMS body or voice
/// transcription.
///
/// Takes the first 4-8 digit run in the text. When the text contains no such
/// run (some voice transcriptions spell the digits out), the full trimmed
/// text is returned so the user can read the code themselves.
///
/// Heuristic: a message that embeds another digit run before the code (for
/// example a short phone number) will mis-extract. The first-match behaviour
/// is intentional and matches what users see in the product today.
pub fn extract_code(text: &str) -> String {
    match CODE_REGEX.find(text) {
        Some(m) => m.as_str().to_string(),
        None => text.trim().to_string(),
    }
}
