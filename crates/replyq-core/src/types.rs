// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the replyq workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Where a queue entry came from. Informs the default priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// A human operator approved an AI-drafted reply.
    Approved,
    /// A direct-post request issued by an operator.
    Manual,
    /// Bulk import of historical work.
    Backfill,
}

impl EntrySource {
    /// Default priority for entries of this source. Higher runs sooner.
    pub fn default_priority(self) -> i64 {
        match self {
            EntrySource::Manual => 10,
            EntrySource::Approved => 5,
            EntrySource::Backfill => 0,
        }
    }
}

/// Lifecycle state of a queue entry. See the state machine in the store crate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

/// Classified failure kind for a post attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The target resource was deleted or is not visible.
    PermanentTargetGone,
    /// The target's settings restrict who may reply.
    PermanentRestricted,
    /// Identical content already posted. Success-equivalent.
    Duplicate,
    /// The platform's per-window posting quota was exceeded.
    RateLimited,
    /// Credentials rejected. Requires operator intervention.
    AuthFailure,
    /// Anything else: 5xx, network error, per-call timeout, malformed response.
    TransientUnknown,
}

impl ErrorKind {
    /// Whether the batch may automatically retry an entry that failed this way.
    pub fn retryable(self) -> bool {
        matches!(self, ErrorKind::TransientUnknown)
    }

    /// Whether this kind trips the consecutive-failure breaker.
    ///
    /// Only failures that suggest the posting pipeline itself is broken count.
    /// Item-specific outcomes (gone, restricted, duplicate) and the global
    /// rate limit must not penalize other valid items.
    pub fn counts_as_consecutive_failure(self) -> bool {
        matches!(self, ErrorKind::TransientUnknown | ErrorKind::AuthFailure)
    }
}

/// Verdict produced by the error classifier for one post attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorClassification {
    pub kind: ErrorKind,
    pub retryable: bool,
    pub counts_as_consecutive_failure: bool,
    /// Raw status and message detail, preserved for the audit record.
    pub detail: String,
}

impl ErrorClassification {
    /// Build a classification from a kind, deriving the policy flags.
    pub fn from_kind(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            retryable: kind.retryable(),
            counts_as_consecutive_failure: kind.counts_as_consecutive_failure(),
            detail: detail.into(),
        }
    }
}

/// The reply text and its structured metadata. Stored as JSON in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPayload {
    /// The reply text to post.
    pub text: String,
    /// Identifier of the originating draft in the approval system, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
}

/// The last classified error recorded against a queue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    pub kind: ErrorKind,
    pub detail: String,
}

/// A durable work item: one approved reply awaiting (or done) posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    /// Identifier of the external resource being replied to.
    pub target_id: String,
    pub payload: ReplyPayload,
    pub source: EntrySource,
    /// Higher runs sooner. Ties break oldest-first.
    pub priority: i64,
    pub status: EntryStatus,
    /// Incremented only on retryable failures.
    pub retry_count: i64,
    pub last_error: Option<LastError>,
    /// RFC3339 UTC timestamps, generated by the store.
    pub added_at: String,
    pub processed_at: Option<String>,
}

/// Request to create a queue entry, produced by the draft approval feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntry {
    pub target_id: String,
    pub payload: ReplyPayload,
    pub source: EntrySource,
    /// Explicit priority; `None` uses the source default.
    pub priority: Option<i64>,
}

impl NewEntry {
    /// The priority this entry enters the queue at.
    pub fn effective_priority(&self) -> i64 {
        self.priority
            .unwrap_or_else(|| self.source.default_priority())
    }
}

/// Raw outcome of one external post operation.
///
/// Transport failures and per-call timeouts are represented with
/// `http_status == 0` so the classifier lands them in `transient_unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostOutcome {
    pub http_status: u16,
    pub message: String,
    /// Explicit quota-reset hint from the platform, when provided.
    pub reset_hint: Option<DateTime<Utc>>,
    /// Identifier of the created post on success.
    pub post_id: Option<String>,
}

impl PostOutcome {
    /// Outcome for a successfully created post.
    pub fn success(post_id: impl Into<String>) -> Self {
        Self {
            http_status: 201,
            message: String::new(),
            reset_hint: None,
            post_id: Some(post_id.into()),
        }
    }

    /// Outcome for a transport-level failure (no HTTP response).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            http_status: 0,
            message: message.into(),
            reset_hint: None,
            post_id: None,
        }
    }

    /// Whether the post was created.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.http_status)
    }
}

/// A time-bounded authorization token for the external posting API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    /// Expiry hint from the issuer, when provided.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Why a batch stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// No eligible pending entries remain.
    Drained,
    /// The per-batch item budget was spent.
    MaxItems,
    /// The batch deadline passed.
    Deadline,
    /// The platform signalled quota exceeded.
    RateLimited,
    /// Too many consecutive pipeline failures in a row.
    CircuitBreaker,
}

/// Aggregate result of one batch run, surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Post attempts made (claims that reached the platform).
    pub attempted: u32,
    /// Entries that reached `completed` via an actual post.
    pub completed: u32,
    /// Entries completed because the reply already existed (409).
    pub duplicates: u32,
    /// Entries returned to `pending` for a later attempt.
    pub requeued: u32,
    /// Entries that reached `failed`.
    pub failed: u32,
    pub halt: HaltReason,
    /// When the governor halted, the earliest time posting may resume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_at: Option<DateTime<Utc>>,
}

/// A fire-and-forget entry status transition, for real-time UI updates.
///
/// Best-effort delivery: the queue store remains the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub entry_id: i64,
    pub target_id: String,
    pub status: EntryStatus,
}

/// Counts per status, exposed to collaborators for dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub pending: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
}

/// Filter for listing queue entries.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<EntryStatus>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn entry_status_round_trips_through_strings() {
        for status in [
            EntryStatus::Pending,
            EntryStatus::Processing,
            EntryStatus::Completed,
            EntryStatus::Failed,
            EntryStatus::Cancelled,
        ] {
            let s = status.to_string();
            let parsed = EntryStatus::from_str(&s).expect("should parse back");
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn error_kind_round_trips_through_strings() {
        let kinds = [
            ErrorKind::PermanentTargetGone,
            ErrorKind::PermanentRestricted,
            ErrorKind::Duplicate,
            ErrorKind::RateLimited,
            ErrorKind::AuthFailure,
            ErrorKind::TransientUnknown,
        ];
        for kind in kinds {
            let s = kind.to_string();
            let parsed = ErrorKind::from_str(&s).expect("should parse back");
            assert_eq!(kind, parsed);
        }
        assert_eq!(
            ErrorKind::PermanentTargetGone.to_string(),
            "permanent_target_gone"
        );
    }

    #[test]
    fn only_transient_unknown_is_retryable() {
        assert!(ErrorKind::TransientUnknown.retryable());
        assert!(!ErrorKind::PermanentTargetGone.retryable());
        assert!(!ErrorKind::PermanentRestricted.retryable());
        assert!(!ErrorKind::Duplicate.retryable());
        assert!(!ErrorKind::RateLimited.retryable());
        assert!(!ErrorKind::AuthFailure.retryable());
    }

    #[test]
    fn only_pipeline_failures_count_toward_breaker() {
        assert!(ErrorKind::TransientUnknown.counts_as_consecutive_failure());
        assert!(ErrorKind::AuthFailure.counts_as_consecutive_failure());
        assert!(!ErrorKind::PermanentTargetGone.counts_as_consecutive_failure());
        assert!(!ErrorKind::PermanentRestricted.counts_as_consecutive_failure());
        assert!(!ErrorKind::Duplicate.counts_as_consecutive_failure());
        assert!(!ErrorKind::RateLimited.counts_as_consecutive_failure());
    }

    #[test]
    fn classification_derives_flags_from_kind() {
        let c = ErrorClassification::from_kind(ErrorKind::TransientUnknown, "HTTP 503");
        assert!(c.retryable);
        assert!(c.counts_as_consecutive_failure);

        let c = ErrorClassification::from_kind(ErrorKind::Duplicate, "HTTP 409");
        assert!(!c.retryable);
        assert!(!c.counts_as_consecutive_failure);
    }

    #[test]
    fn source_default_priorities_order_manual_first() {
        assert!(
            EntrySource::Manual.default_priority() > EntrySource::Approved.default_priority()
        );
        assert!(
            EntrySource::Approved.default_priority() > EntrySource::Backfill.default_priority()
        );
    }

    #[test]
    fn new_entry_explicit_priority_wins() {
        let entry = NewEntry {
            target_id: "t1".into(),
            payload: ReplyPayload {
                text: "hi".into(),
                draft_id: None,
            },
            source: EntrySource::Approved,
            priority: Some(42),
        };
        assert_eq!(entry.effective_priority(), 42);

        let entry = NewEntry {
            priority: None,
            ..entry
        };
        assert_eq!(entry.effective_priority(), 5);
    }

    #[test]
    fn transport_outcome_is_not_success() {
        let outcome = PostOutcome::transport("connection refused");
        assert_eq!(outcome.http_status, 0);
        assert!(!outcome.is_success());

        let outcome = PostOutcome::success("post-1");
        assert!(outcome.is_success());
        assert_eq!(outcome.post_id.as_deref(), Some("post-1"));
    }

    #[test]
    fn reply_payload_json_round_trip() {
        let payload = ReplyPayload {
            text: "great episode!".into(),
            draft_id: Some("draft-9".into()),
        };
        let json = serde_json::to_string(&payload).unwrap();
        let back: ReplyPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(payload, back);

        // draft_id is optional on the wire.
        let back: ReplyPayload = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert!(back.draft_id.is_none());
    }
}
