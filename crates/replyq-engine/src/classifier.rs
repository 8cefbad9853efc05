// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error classifier: maps a raw post outcome onto the failure taxonomy.
//!
//! The decision table is checked in order and the first match wins. Message
//! matching is case-insensitive substring matching on the structured message
//! the platform client already folded out of the error body. Policy flags
//! (retryable, counts toward the breaker) derive from the kind; the table
//! only decides the kind.

use replyq_core::types::{ErrorClassification, ErrorKind, PostOutcome};

/// 403 phrasings for a target that no longer exists or cannot be seen.
const TARGET_GONE_MARKERS: &[&str] = &["deleted", "not visible", "no status found"];

/// 403 phrasings for reply-eligibility restrictions on a live target.
const RESTRICTED_MARKERS: &[&str] = &[
    "who can reply",
    "not allowed to reply",
    "replies are limited",
    "cannot reply",
];

/// Classify a non-success post outcome.
///
/// Pure and side-effect free. Successful outcomes never reach this function;
/// the processor checks `PostOutcome::is_success` first. An unmatched 403
/// falls through to `transient_unknown` rather than guessing at permanence.
pub fn classify(outcome: &PostOutcome) -> ErrorClassification {
    let detail = if outcome.message.is_empty() {
        format!("HTTP {}", outcome.http_status)
    } else {
        outcome.message.clone()
    };
    let message = outcome.message.to_lowercase();

    let kind = match outcome.http_status {
        403 if contains_any(&message, TARGET_GONE_MARKERS) => ErrorKind::PermanentTargetGone,
        403 if contains_any(&message, RESTRICTED_MARKERS) => ErrorKind::PermanentRestricted,
        409 => ErrorKind::Duplicate,
        429 => ErrorKind::RateLimited,
        401 => ErrorKind::AuthFailure,
        _ => ErrorKind::TransientUnknown,
    };

    ErrorClassification::from_kind(kind, detail)
}

fn contains_any(message: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| message.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: u16, message: &str) -> PostOutcome {
        PostOutcome {
            http_status: status,
            message: message.to_string(),
            reset_hint: None,
            post_id: None,
        }
    }

    #[test]
    fn deleted_target_is_permanent_gone() {
        let c = classify(&outcome(
            403,
            "HTTP 403: the Tweet you are replying to was deleted",
        ));
        assert_eq!(c.kind, ErrorKind::PermanentTargetGone);
        assert!(!c.retryable);
        assert!(!c.counts_as_consecutive_failure);
    }

    #[test]
    fn invisible_target_is_permanent_gone() {
        let c = classify(&outcome(403, "HTTP 403: this content is Not Visible to you"));
        assert_eq!(c.kind, ErrorKind::PermanentTargetGone);
    }

    #[test]
    fn reply_restriction_is_permanent_restricted() {
        let c = classify(&outcome(
            403,
            "HTTP 403: the author limited who can reply to this conversation",
        ));
        assert_eq!(c.kind, ErrorKind::PermanentRestricted);
        assert!(!c.retryable);
        assert!(!c.counts_as_consecutive_failure);
    }

    #[test]
    fn gone_markers_win_over_restriction_markers() {
        // Table order: rule 1 is checked before rule 2.
        let c = classify(&outcome(
            403,
            "HTTP 403: deleted conversation, who can reply no longer applies",
        ));
        assert_eq!(c.kind, ErrorKind::PermanentTargetGone);
    }

    #[test]
    fn unmatched_403_is_transient() {
        let c = classify(&outcome(403, "HTTP 403: forbidden"));
        assert_eq!(c.kind, ErrorKind::TransientUnknown);
        assert!(c.retryable);
    }

    #[test]
    fn conflict_is_duplicate() {
        let c = classify(&outcome(409, "HTTP 409: duplicate content"));
        assert_eq!(c.kind, ErrorKind::Duplicate);
        assert!(!c.retryable);
        assert!(!c.counts_as_consecutive_failure);
    }

    #[test]
    fn quota_exceeded_is_rate_limited() {
        let c = classify(&outcome(429, "HTTP 429: too many requests"));
        assert_eq!(c.kind, ErrorKind::RateLimited);
        assert!(!c.retryable);
        assert!(!c.counts_as_consecutive_failure);
    }

    #[test]
    fn unauthorized_is_auth_failure_and_counts() {
        let c = classify(&outcome(401, "HTTP 401: unauthorized"));
        assert_eq!(c.kind, ErrorKind::AuthFailure);
        assert!(!c.retryable);
        assert!(c.counts_as_consecutive_failure);
    }

    #[test]
    fn server_errors_and_transport_failures_are_transient() {
        for o in [
            outcome(500, "HTTP 500: internal error"),
            outcome(503, "HTTP 503: over capacity"),
            PostOutcome::transport("connection reset by peer"),
            PostOutcome::transport("request timed out after 30s"),
        ] {
            let c = classify(&o);
            assert_eq!(c.kind, ErrorKind::TransientUnknown, "{}", o.message);
            assert!(c.retryable);
            assert!(c.counts_as_consecutive_failure);
        }
    }

    #[test]
    fn detail_preserves_the_raw_message() {
        let c = classify(&outcome(503, "HTTP 503: over capacity"));
        assert_eq!(c.detail, "HTTP 503: over capacity");

        // A bare status still yields a usable audit detail.
        let c = classify(&outcome(500, ""));
        assert_eq!(c.detail, "HTTP 500");
    }
}
