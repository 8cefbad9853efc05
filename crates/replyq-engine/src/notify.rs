// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort status-change notifications for real-time UI consumers.
//!
//! Delivery is lossy by design: a slow or absent subscriber never blocks the
//! batch, and the queue store remains the source of truth.

use tokio::sync::broadcast;

use replyq_core::types::{EntryStatus, StatusChange};

const DEFAULT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct StatusNotifier {
    tx: broadcast::Sender<StatusChange>,
}

impl StatusNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.tx.subscribe()
    }

    /// Publish a transition. Send errors (no subscribers) are ignored.
    pub fn notify(&self, entry_id: i64, target_id: &str, status: EntryStatus) {
        let _ = self.tx.send(StatusChange {
            entry_id,
            target_id: target_id.to_string(),
            status,
        });
    }
}

impl Default for StatusNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_transitions_in_order() {
        let notifier = StatusNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.notify(1, "t1", EntryStatus::Processing);
        notifier.notify(1, "t1", EntryStatus::Completed);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.entry_id, 1);
        assert_eq!(first.status, EntryStatus::Processing);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.status, EntryStatus::Completed);
    }

    #[test]
    fn notify_without_subscribers_is_a_no_op() {
        let notifier = StatusNotifier::new();
        notifier.notify(1, "t1", EntryStatus::Completed);
    }
}
