// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch processor: the sequential control loop that drains the queue.
//!
//! One batch at a time, one item at a time. The platform's rate limit is a
//! single shared budget, so there is no intra-batch parallelism; the fixed
//! inter-post delay dominates wall-clock time anyway. Per-item failures are
//! classified and recorded locally and the loop keeps going; only the
//! circuit breaker, the rate governor, the deadline, and a failed credential
//! refresh stop a batch early.
//!
//! Single-pass semantics: every claimed id joins an exclusion set so a
//! requeued item is not retried immediately after its own failure. When the
//! pass drains and budget remains, the set is cleared once, letting requeued
//! items get a second attempt within the same batch without hot-looping.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use replyq_core::types::{BatchSummary, EntryStatus, ErrorKind, HaltReason};
use replyq_core::{PostClient, QueueStore, ReplyqError};

use crate::classifier::classify;
use crate::governor::RateGovernor;
use crate::lease::CredentialLeaseManager;
use crate::notify::StatusNotifier;

pub struct BatchProcessor {
    store: Arc<dyn QueueStore>,
    client: Arc<dyn PostClient>,
    lease: CredentialLeaseManager,
    governor: RateGovernor,
    notifier: StatusNotifier,
    /// Consecutive counted failures that trip the circuit breaker.
    failure_threshold: u32,
    /// Retryable-attempt cap per entry.
    max_retries: i64,
}

impl BatchProcessor {
    pub fn new(
        store: Arc<dyn QueueStore>,
        client: Arc<dyn PostClient>,
        lease: CredentialLeaseManager,
        governor: RateGovernor,
        notifier: StatusNotifier,
        failure_threshold: u32,
        max_retries: i64,
    ) -> Self {
        Self {
            store,
            client,
            lease,
            governor,
            notifier,
            failure_threshold,
            max_retries,
        }
    }

    /// Run one batch: up to `max_items` post attempts, bounded by `deadline`.
    ///
    /// Returns an error only for faults the loop cannot recover from
    /// (credential refresh, store I/O). Everything the platform says about an
    /// individual item is absorbed into that item's terminal status.
    pub async fn run_batch(
        &mut self,
        max_items: u32,
        deadline: Instant,
    ) -> Result<BatchSummary, ReplyqError> {
        let mut summary = BatchSummary {
            attempted: 0,
            completed: 0,
            duplicates: 0,
            requeued: 0,
            failed: 0,
            halt: HaltReason::Drained,
            resume_at: None,
        };
        let mut consecutive_failures: u32 = 0;
        // Ids attempted this pass; claim_next skips them.
        let mut attempted_ids: Vec<i64> = Vec::new();
        let mut exclusion_reset_used = false;

        self.lease.force_refresh().await?;

        summary.halt = loop {
            if Instant::now() >= deadline {
                break HaltReason::Deadline;
            }
            if self.governor.should_halt() {
                break HaltReason::RateLimited;
            }
            if consecutive_failures >= self.failure_threshold {
                warn!(consecutive_failures, "circuit breaker tripped");
                break HaltReason::CircuitBreaker;
            }
            if summary.attempted >= max_items {
                break HaltReason::MaxItems;
            }

            let credential = self.lease.refresh_if_stale().await?;

            let entry = match self.store.claim_next(&attempted_ids).await? {
                Some(entry) => entry,
                None if !exclusion_reset_used && !attempted_ids.is_empty() => {
                    // The pass is over; give requeued items one more chance
                    // with the remaining budget.
                    exclusion_reset_used = true;
                    attempted_ids.clear();
                    continue;
                }
                None => break HaltReason::Drained,
            };
            attempted_ids.push(entry.id);
            summary.attempted += 1;
            self.notifier
                .notify(entry.id, &entry.target_id, EntryStatus::Processing);
            debug!(
                entry_id = entry.id,
                target_id = %entry.target_id,
                retry_count = entry.retry_count,
                "posting reply"
            );

            let outcome = self
                .client
                .post(&entry.target_id, &entry.payload, &credential)
                .await?;

            if outcome.is_success() {
                self.store.mark_completed(entry.id).await?;
                summary.completed += 1;
                consecutive_failures = 0;
                self.notifier
                    .notify(entry.id, &entry.target_id, EntryStatus::Completed);
                info!(
                    entry_id = entry.id,
                    target_id = %entry.target_id,
                    post_id = outcome.post_id.as_deref().unwrap_or(""),
                    "reply posted"
                );
            } else {
                let verdict = classify(&outcome);
                debug!(
                    entry_id = entry.id,
                    kind = %verdict.kind,
                    detail = %verdict.detail,
                    "post attempt failed"
                );
                match verdict.kind {
                    ErrorKind::Duplicate => {
                        // The desired state already holds; record the kind so
                        // the audit trail distinguishes it from a fresh post.
                        self.store.mark_duplicate(entry.id, &verdict.detail).await?;
                        summary.duplicates += 1;
                        consecutive_failures = 0;
                        self.notifier
                            .notify(entry.id, &entry.target_id, EntryStatus::Completed);
                    }
                    ErrorKind::RateLimited => {
                        // The quota is global, not this entry's fault: the
                        // claim is released without a retry-count increment.
                        self.store
                            .release_claim(entry.id, verdict.kind, &verdict.detail)
                            .await?;
                        summary.requeued += 1;
                        self.governor.record_quota_exceeded(outcome.reset_hint);
                        self.notifier
                            .notify(entry.id, &entry.target_id, EntryStatus::Pending);
                    }
                    ErrorKind::TransientUnknown => {
                        let status = self
                            .store
                            .requeue_transient(
                                entry.id,
                                verdict.kind,
                                &verdict.detail,
                                self.max_retries,
                            )
                            .await?;
                        match status {
                            EntryStatus::Pending => summary.requeued += 1,
                            _ => summary.failed += 1,
                        }
                        consecutive_failures += 1;
                        self.notifier.notify(entry.id, &entry.target_id, status);
                    }
                    ErrorKind::PermanentTargetGone
                    | ErrorKind::PermanentRestricted
                    | ErrorKind::AuthFailure => {
                        self.store
                            .mark_failed(entry.id, verdict.kind, &verdict.detail)
                            .await?;
                        summary.failed += 1;
                        if verdict.counts_as_consecutive_failure {
                            consecutive_failures += 1;
                        }
                        self.notifier
                            .notify(entry.id, &entry.target_id, EntryStatus::Failed);
                    }
                }
            }

            let halting = Instant::now() >= deadline
                || self.governor.should_halt()
                || consecutive_failures >= self.failure_threshold
                || summary.attempted >= max_items;
            if !halting {
                self.governor.await_slot().await;
            }
        };

        summary.resume_at = self.governor.resume_at();
        info!(
            attempted = summary.attempted,
            completed = summary.completed,
            duplicates = summary.duplicates,
            requeued = summary.requeued,
            failed = summary.failed,
            halt = %summary.halt,
            "batch finished"
        );
        Ok(summary)
    }
}
