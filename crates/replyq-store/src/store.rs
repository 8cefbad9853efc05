// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `QueueStore` trait.

use async_trait::async_trait;
use tracing::debug;

use replyq_core::types::{
    EntryStatus, ErrorKind, ListFilter, NewEntry, QueueEntry, QueueStats,
};
use replyq_core::{QueueStore, ReplyqError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed queue store.
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query module.
pub struct SqliteQueueStore {
    db: Database,
}

impl SqliteQueueStore {
    /// Open (or create) the store at `database_path`.
    pub async fn open(database_path: &str) -> Result<Self, ReplyqError> {
        let db = Database::open(database_path).await?;
        debug!(path = database_path, "queue store opened");
        Ok(Self { db })
    }

    /// Checkpoint the WAL and close.
    pub async fn close(&self) -> Result<(), ReplyqError> {
        self.db.close().await
    }
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn enqueue(&self, entry: &NewEntry) -> Result<i64, ReplyqError> {
        queries::queue::enqueue(&self.db, entry).await
    }

    async fn get(&self, id: i64) -> Result<Option<QueueEntry>, ReplyqError> {
        queries::queue::get(&self.db, id).await
    }

    async fn claim_next(&self, exclude: &[i64]) -> Result<Option<QueueEntry>, ReplyqError> {
        queries::queue::claim_next(&self.db, exclude).await
    }

    async fn mark_completed(&self, id: i64) -> Result<(), ReplyqError> {
        queries::queue::mark_completed(&self.db, id).await
    }

    async fn mark_duplicate(&self, id: i64, detail: &str) -> Result<(), ReplyqError> {
        queries::queue::mark_duplicate(&self.db, id, detail).await
    }

    async fn mark_failed(
        &self,
        id: i64,
        kind: ErrorKind,
        detail: &str,
    ) -> Result<(), ReplyqError> {
        queries::queue::mark_failed(&self.db, id, kind, detail).await
    }

    async fn requeue_transient(
        &self,
        id: i64,
        kind: ErrorKind,
        detail: &str,
        max_retries: i64,
    ) -> Result<EntryStatus, ReplyqError> {
        queries::queue::requeue_transient(&self.db, id, kind, detail, max_retries).await
    }

    async fn release_claim(
        &self,
        id: i64,
        kind: ErrorKind,
        detail: &str,
    ) -> Result<(), ReplyqError> {
        queries::queue::release_claim(&self.db, id, kind, detail).await
    }

    async fn release_stale_claims(&self) -> Result<usize, ReplyqError> {
        queries::queue::release_stale_claims(&self.db).await
    }

    async fn cancel(&self, ids: &[i64]) -> Result<usize, ReplyqError> {
        queries::queue::cancel(&self.db, ids).await
    }

    async fn retry(&self, ids: &[i64]) -> Result<usize, ReplyqError> {
        queries::queue::retry(&self.db, ids).await
    }

    async fn set_priority(&self, ids: &[i64], priority: i64) -> Result<usize, ReplyqError> {
        queries::queue::set_priority(&self.db, ids, priority).await
    }

    async fn stats(&self) -> Result<QueueStats, ReplyqError> {
        queries::queue::stats(&self.db).await
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<QueueEntry>, ReplyqError> {
        queries::queue::list(&self.db, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replyq_core::types::{EntrySource, ReplyPayload};
    use tempfile::tempdir;

    #[tokio::test]
    async fn store_works_as_trait_object() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("trait.db");
        let store = SqliteQueueStore::open(db_path.to_str().unwrap())
            .await
            .unwrap();
        let store: &dyn QueueStore = &store;

        let id = store
            .enqueue(&NewEntry {
                target_id: "t1".into(),
                payload: ReplyPayload {
                    text: "hello".into(),
                    draft_id: Some("d1".into()),
                },
                source: EntrySource::Manual,
                priority: None,
            })
            .await
            .unwrap();

        let claimed = store.claim_next(&[]).await.unwrap().unwrap();
        assert_eq!(claimed.id, id);
        assert_eq!(claimed.priority, 10, "manual source defaults to 10");
        assert_eq!(claimed.payload.draft_id.as_deref(), Some("d1"));

        store.mark_completed(id).await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test]
    async fn concurrent_enqueues_all_land() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("concurrent.db");
        let store = std::sync::Arc::new(
            SqliteQueueStore::open(db_path.to_str().unwrap())
                .await
                .unwrap(),
        );

        // 10 concurrent writers through the single background thread.
        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .enqueue(&NewEntry {
                        target_id: format!("t-{i}"),
                        payload: ReplyPayload {
                            text: format!("reply {i}"),
                            draft_id: None,
                        },
                        source: EntrySource::Approved,
                        priority: None,
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.pending, 10);
    }
}
