//! Rate-limit header parsing

use reqwest::header::HeaderMap;
use tracing::{debug, warn};

pub const RATELIMIT_LIMIT: &str = "ratelimit-limit";
pub const RATELIMIT_REMAINING: &str = "ratelimit-remaining";
pub const RATELIMIT_RESET: &str = "ratelimit-reset";

/// Rate-limit figures read from a single registry response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitSample {
    /// Maximum number of pulls in the current window
    pub limit: u64,
    /// Pulls left in the current window
    pub remaining: u64,
    /// Seconds until the window resets (0 when not reported)
    pub reset: u64,
}

/// Strip the window suffix from a rate-limit header value.
///
/// Docker Hub reports values as `<number>;w=<window>`. Everything after the
/// first `;` is dropped; a value without `;` is returned as-is.
pub fn extract_limit(raw: &str) -> &str {
    match raw.split_once(';') {
        Some((value, _)) => value,
        None => raw,
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<u64> {
    let raw = headers.get(name)?;

    let raw = match raw.to_str() {
        Ok(s) => s,
        Err(_) => {
            warn!("Header {} is not valid ASCII, using 0", name);
            return Some(0);
        }
    };

    debug!("Extracting limit from {}: {}", name, raw);

    let value = extract_limit(raw).trim();
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Malformed {} header value {:?}, using 0", name, raw);
            Some(0)
        }
    }
}

/// Build a sample from the registry response headers.
///
/// Limit and remaining are only read when both headers are present;
/// otherwise both stay at 0.
pub fn parse_limit_headers(headers: &HeaderMap) -> RateLimitSample {
    let mut sample = RateLimitSample::default();

    if let (Some(limit), Some(remaining)) = (
        header_value(headers, RATELIMIT_LIMIT),
        header_value(headers, RATELIMIT_REMAINING),
    ) {
        sample.limit = limit;
        sample.remaining = remaining;
    }

    if let Some(reset) = header_value(headers, RATELIMIT_RESET) {
        sample.reset = reset;
    }

    sample
}
