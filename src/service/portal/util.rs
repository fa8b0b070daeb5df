use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;

use super::model::UNKNOWN_RESPONSE;

static MESSAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<message><!\[CDATA\[(.*?)\]\]></message>")
        .context("Failed to create portal message regex")
        .unwrap()
});

static STATUS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<status>\s*(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))\s*</status>")
        .context("Failed to create portal status regex")
        .unwrap()
});

/// Portal wording that counts as a successful login.
const SUCCESS_MARKERS: [&str; 2] = ["logged in", "success"];

/// Returns the text of the first CDATA-wrapped `<message>`, or
/// `"Unknown response"` when there is none.
pub fn extract_message(body: &str) -> String {
    MESSAGE_REGEX
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_RESPONSE.to_string())
}

/// Returns the first `<status>` value, with or without a CDATA wrapper.
pub fn extract_status(body: &str) -> Option<String> {
    let caps = STATUS_REGEX.captures(body)?;
    let value = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn is_successful(status: Option<&str>, message: &str) -> bool {
    if status.is_some_and(|s| s.contains("LIVE")) {
        return true;
    }

    let message = message.to_lowercase();
    SUCCESS_MARKERS.iter().any(|marker| message.contains(marker))
}
