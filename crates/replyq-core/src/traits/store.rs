// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue store trait: the durable record of work items.

use async_trait::async_trait;

use crate::error::ReplyqError;
use crate::types::{
    EntryStatus, ErrorKind, ListFilter, NewEntry, QueueEntry, QueueStats,
};

/// The durable queue of posting work.
///
/// Status transitions are monotonic except `processing -> pending` (requeue
/// on a transient or rate-limited outcome) and `pending -> cancelled`
/// (operator action). Entries are never deleted; completed, cancelled, and
/// failed rows remain for audit.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Insert a new pending entry. Returns the entry id.
    async fn enqueue(&self, entry: &NewEntry) -> Result<i64, ReplyqError>;

    /// Fetch a single entry by id.
    async fn get(&self, id: i64) -> Result<Option<QueueEntry>, ReplyqError>;

    /// Atomically claim the next eligible pending entry
    /// (`pending -> processing`).
    ///
    /// Candidates are ordered by priority descending, then `added_at`
    /// ascending. An entry is skipped while another entry with the same
    /// `target_id` is `processing`, and ids in `exclude` (already attempted
    /// this pass) are skipped. Returns `None` when nothing is claimable --
    /// losing a claim race is not an error.
    async fn claim_next(&self, exclude: &[i64]) -> Result<Option<QueueEntry>, ReplyqError>;

    /// `processing -> completed` after a successful post.
    async fn mark_completed(&self, id: i64) -> Result<(), ReplyqError>;

    /// `processing -> completed` for a duplicate outcome. The entry records
    /// `duplicate` as its last error so the audit trail distinguishes
    /// "posted now" from "already existed".
    async fn mark_duplicate(&self, id: i64, detail: &str) -> Result<(), ReplyqError>;

    /// `processing -> failed` on a permanent verdict. `retry_count` is left
    /// untouched.
    async fn mark_failed(
        &self,
        id: i64,
        kind: ErrorKind,
        detail: &str,
    ) -> Result<(), ReplyqError>;

    /// Record a retryable failure: increments `retry_count` and returns the
    /// entry to `pending` at its existing priority, or to `failed` once the
    /// count reaches `max_retries`. Returns the resulting status.
    async fn requeue_transient(
        &self,
        id: i64,
        kind: ErrorKind,
        detail: &str,
        max_retries: i64,
    ) -> Result<EntryStatus, ReplyqError>;

    /// `processing -> pending` without touching `retry_count`. Used when the
    /// batch halts for a global reason (rate limit) that is not the item's
    /// fault.
    async fn release_claim(
        &self,
        id: i64,
        kind: ErrorKind,
        detail: &str,
    ) -> Result<(), ReplyqError>;

    /// Return any `processing` rows to `pending` at startup. With a single
    /// sequential worker, a `processing` row at batch start is an orphan
    /// from an interrupted run. Returns the number of rows released.
    async fn release_stale_claims(&self) -> Result<usize, ReplyqError>;

    /// Operator action: `pending -> cancelled`. Entries in any other state
    /// are left alone. Returns the number of entries cancelled.
    async fn cancel(&self, ids: &[i64]) -> Result<usize, ReplyqError>;

    /// Operator action: `failed -> pending` with `retry_count` reset to 0.
    /// Returns the number of entries requeued.
    async fn retry(&self, ids: &[i64]) -> Result<usize, ReplyqError>;

    /// Operator action: change priority of pending entries. Returns the
    /// number of entries updated.
    async fn set_priority(&self, ids: &[i64], priority: i64) -> Result<usize, ReplyqError>;

    /// Counts per status.
    async fn stats(&self) -> Result<QueueStats, ReplyqError>;

    /// List entries, newest first, optionally filtered by status.
    async fn list(&self, filter: &ListFilter) -> Result<Vec<QueueEntry>, ReplyqError>;
}
