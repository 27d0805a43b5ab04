//! Logging helpers for classifier traffic. Everything goes through the `log`
//! facade, so a missing or failing logger never affects control flow.

use std::borrow::Cow;
use std::fmt::Display;

pub const TARGET: &str = "lungscan::api";
pub const MAX_PAYLOAD_CHARS: usize = 512;

pub fn truncate_payload(payload: &str) -> Cow<'_, str> {
    match payload.char_indices().nth(MAX_PAYLOAD_CHARS) {
        Some((cut, _)) => Cow::Owned(format!(
            "{}... ({} bytes total)",
            &payload[..cut],
            payload.len()
        )),
        None => Cow::Borrowed(payload),
    }
}

pub fn api_request(method: &str, url: &str, variant: impl Display) {
    log::info!(target: TARGET, "API Request: {} {} [{}]", method, url, variant);
}

pub fn api_response(url: &str, status: u16, body: &str) {
    if (200..300).contains(&status) {
        log::info!(target: TARGET, "API Response: {} ({}) {}", url, status, truncate_payload(body));
    } else {
        log::error!(target: TARGET, "API Response: {} ({}) {}", url, status, truncate_payload(body));
    }
}

pub fn api_error(url: &str, variant: impl Display, error: impl Display) {
    log::error!(target: TARGET, "API Error: {} [{}]: {}", url, variant, error);
}
