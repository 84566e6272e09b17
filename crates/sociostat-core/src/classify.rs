//! Failure classification for provider fetches.
//!
//! The three providers share no error contract: one returns HTTP 429 on a
//! usage cap, another a 200 with an apology string, a third a plain message
//! naming the missing username. The substring heuristics here are loose on
//! purpose and live only in this module, so callers can tell "retry later"
//! from "bad handle" from "broken integration" without depending on any
//! transport library's error types.

use std::fmt::{Display, Formatter};

/// Classified fetch failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Upstream usage cap hit; recoverable later. Never cached and never
    /// conflated with an invalid handle.
    QuotaExceeded,
    /// The handle does not exist on that provider; recoverable only by
    /// correcting the handle.
    NotFound,
    /// Network failure, malformed payload, or anything unclassified.
    Generic,
}

/// Classified error returned by adapters and the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::QuotaExceeded,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Generic,
            message: message.into(),
            retryable: true,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::QuotaExceeded => "fetch.quota_exceeded",
            FetchErrorKind::NotFound => "fetch.not_found",
            FetchErrorKind::Generic => "fetch.generic",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// Classify a failure from its message alone.
///
/// Case-insensitive substring matching: "quota"/"exceeded" mark a usage
/// cap, "not found"/"username" a missing handle, anything else is generic.
pub fn classify_message(message: impl Into<String>) -> FetchError {
    let message = message.into();
    let lowered = message.to_ascii_lowercase();

    if lowered.contains("quota") || lowered.contains("exceeded") {
        FetchError::quota_exceeded(message)
    } else if lowered.contains("not found") || lowered.contains("username") {
        FetchError::not_found(message)
    } else {
        FetchError::generic(message)
    }
}

/// Classify a non-success HTTP response.
///
/// 429 is a quota hit regardless of the body; other statuses defer to the
/// message heuristics.
pub fn classify_response(status: u16, message: impl Into<String>) -> FetchError {
    if status == 429 {
        return FetchError::quota_exceeded(message);
    }
    classify_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_quota_exceeded() {
        let error = classify_response(429, "tiktok upstream returned status 429");
        assert_eq!(error.kind(), FetchErrorKind::QuotaExceeded);
        assert!(error.retryable());
    }

    #[test]
    fn quota_wording_is_quota_exceeded() {
        for message in [
            "monthly quota reached",
            "API rate limit EXCEEDED for this key",
        ] {
            assert_eq!(
                classify_message(message).kind(),
                FetchErrorKind::QuotaExceeded,
                "message: {message}"
            );
        }
    }

    #[test]
    fn missing_handle_wording_is_not_found() {
        for message in ["Username not found", "no such username", "user Not Found"] {
            let error = classify_message(message);
            assert_eq!(error.kind(), FetchErrorKind::NotFound, "message: {message}");
            assert!(!error.retryable());
        }
    }

    #[test]
    fn anything_else_is_generic() {
        let error = classify_message("connection reset by peer");
        assert_eq!(error.kind(), FetchErrorKind::Generic);
        assert!(error.retryable());
    }

    #[test]
    fn quota_wins_over_not_found_wording() {
        // "quota exceeded for username lookups" mentions both; a cap must
        // never be mistaken for a bad handle.
        let error = classify_message("quota exceeded for username lookups");
        assert_eq!(error.kind(), FetchErrorKind::QuotaExceeded);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(FetchError::quota_exceeded("x").code(), "fetch.quota_exceeded");
        assert_eq!(FetchError::not_found("x").code(), "fetch.not_found");
        assert_eq!(FetchError::generic("x").code(), "fetch.generic");
    }
}
