// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue operations: atomic claim, status transitions, operator bulk actions.
//!
//! Every transition out of `pending` or `processing` is a conditional
//! `UPDATE ... WHERE status = '...'`, so a concurrent operator action and a
//! batch run can never both move the same entry.

use replyq_core::types::{
    EntrySource, EntryStatus, ErrorKind, LastError, ListFilter, NewEntry, QueueEntry,
    QueueStats, ReplyPayload,
};
use replyq_core::ReplyqError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Column list matching [`row_to_entry`].
const ENTRY_COLUMNS: &str = "id, target_id, payload, source, priority, status, retry_count, \
                             last_error_kind, last_error_detail, added_at, processed_at";

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<QueueEntry, rusqlite::Error> {
    let payload_json: String = row.get(2)?;
    let payload: ReplyPayload =
        serde_json::from_str(&payload_json).map_err(|e| conversion_err(2, e))?;

    let source: String = row.get(3)?;
    let source: EntrySource = source.parse().map_err(|e| conversion_err(3, e))?;

    let status: String = row.get(5)?;
    let status: EntryStatus = status.parse().map_err(|e| conversion_err(5, e))?;

    let error_kind: Option<String> = row.get(7)?;
    let error_detail: Option<String> = row.get(8)?;
    let last_error = match error_kind {
        Some(kind) => Some(LastError {
            kind: kind.parse().map_err(|e| conversion_err(7, e))?,
            detail: error_detail.unwrap_or_default(),
        }),
        None => None,
    };

    Ok(QueueEntry {
        id: row.get(0)?,
        target_id: row.get(1)?,
        payload,
        source,
        priority: row.get(4)?,
        status,
        retry_count: row.get(6)?,
        last_error,
        added_at: row.get(9)?,
        processed_at: row.get(10)?,
    })
}

/// Render an id list for an `IN (...)` clause. Ids are integers, so inlining
/// them is injection-safe and sidesteps rusqlite's fixed-arity params.
fn id_list(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Insert a new pending entry. Returns the auto-generated entry id.
pub async fn enqueue(db: &Database, entry: &NewEntry) -> Result<i64, ReplyqError> {
    let payload = serde_json::to_string(&entry.payload).map_err(|e| ReplyqError::Store {
        source: Box::new(e),
    })?;
    let target_id = entry.target_id.clone();
    let source = entry.source.to_string();
    let priority = entry.effective_priority();

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO queue (target_id, payload, source, priority)
                 VALUES (?1, ?2, ?3, ?4)",
                params![target_id, payload, source, priority],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a single entry by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<QueueEntry>, ReplyqError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM queue WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], row_to_entry) {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Atomically claim the next eligible pending entry.
///
/// Ordering: priority descending, then `added_at` ascending (FIFO within a
/// priority bucket), then id as the final tiebreak. Entries whose target
/// already has an in-flight `processing` entry are skipped, as are ids in
/// `exclude` (already attempted this pass). Returns `None` when nothing is
/// claimable.
pub async fn claim_next(
    db: &Database,
    exclude: &[i64],
) -> Result<Option<QueueEntry>, ReplyqError> {
    let exclude_clause = if exclude.is_empty() {
        String::new()
    } else {
        format!("AND id NOT IN ({})", id_list(exclude))
    };

    db.connection()
        .call(move |conn| {
            // Transaction makes find + update atomic against other writers.
            let tx = conn.transaction()?;

            let candidate = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {ENTRY_COLUMNS}
                     FROM queue
                     WHERE status = 'pending'
                       AND target_id NOT IN
                           (SELECT target_id FROM queue WHERE status = 'processing')
                       {exclude_clause}
                     ORDER BY priority DESC, added_at ASC, id ASC
                     LIMIT 1"
                ))?;
                match stmt.query_row([], row_to_entry) {
                    Ok(entry) => Some(entry),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };

            match candidate {
                Some(entry) => {
                    // Conditional claim: succeeds only if still pending.
                    let changed = tx.execute(
                        "UPDATE queue SET status = 'processing'
                         WHERE id = ?1 AND status = 'pending'",
                        params![entry.id],
                    )?;
                    tx.commit()?;

                    if changed == 1 {
                        Ok(Some(QueueEntry {
                            status: EntryStatus::Processing,
                            ..entry
                        }))
                    } else {
                        // Lost the race. Not an error.
                        Ok(None)
                    }
                }
                None => {
                    tx.commit()?;
                    Ok(None)
                }
            }
        })
        .await
        .map_err(map_tr_err)
}

/// `processing -> completed` after a successful post.
pub async fn mark_completed(db: &Database, id: i64) -> Result<(), ReplyqError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE queue SET status = 'completed',
                 processed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status = 'processing'",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// `processing -> completed` for a duplicate outcome, keeping the duplicate
/// verdict on the audit record.
pub async fn mark_duplicate(db: &Database, id: i64, detail: &str) -> Result<(), ReplyqError> {
    let detail = detail.to_string();
    let kind = ErrorKind::Duplicate.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE queue SET status = 'completed',
                 last_error_kind = ?2, last_error_detail = ?3,
                 processed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status = 'processing'",
                params![id, kind, detail],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// `processing -> failed` on a permanent verdict. `retry_count` untouched.
pub async fn mark_failed(
    db: &Database,
    id: i64,
    kind: ErrorKind,
    detail: &str,
) -> Result<(), ReplyqError> {
    let detail = detail.to_string();
    let kind = kind.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE queue SET status = 'failed',
                 last_error_kind = ?2, last_error_detail = ?3,
                 processed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status = 'processing'",
                params![id, kind, detail],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Record a retryable failure.
///
/// Increments `retry_count`. At `max_retries` the entry becomes `failed`;
/// below the cap it returns to `pending` at its existing priority. Returns
/// the resulting status.
pub async fn requeue_transient(
    db: &Database,
    id: i64,
    kind: ErrorKind,
    detail: &str,
    max_retries: i64,
) -> Result<EntryStatus, ReplyqError> {
    let detail = detail.to_string();
    let kind = kind.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let retry_count: i64 = tx.query_row(
                "SELECT retry_count FROM queue WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            let new_count = retry_count + 1;

            let status = if new_count >= max_retries {
                tx.execute(
                    "UPDATE queue SET status = 'failed', retry_count = ?2,
                     last_error_kind = ?3, last_error_detail = ?4,
                     processed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?1 AND status = 'processing'",
                    params![id, new_count, kind, detail],
                )?;
                EntryStatus::Failed
            } else {
                tx.execute(
                    "UPDATE queue SET status = 'pending', retry_count = ?2,
                     last_error_kind = ?3, last_error_detail = ?4
                     WHERE id = ?1 AND status = 'processing'",
                    params![id, new_count, kind, detail],
                )?;
                EntryStatus::Pending
            };

            tx.commit()?;
            Ok(status)
        })
        .await
        .map_err(map_tr_err)
}

/// `processing -> pending` without touching `retry_count`. For global halts
/// (rate limit) that are not the item's fault.
pub async fn release_claim(
    db: &Database,
    id: i64,
    kind: ErrorKind,
    detail: &str,
) -> Result<(), ReplyqError> {
    let detail = detail.to_string();
    let kind = kind.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE queue SET status = 'pending',
                 last_error_kind = ?2, last_error_detail = ?3
                 WHERE id = ?1 AND status = 'processing'",
                params![id, kind, detail],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Return orphaned `processing` rows to `pending`.
///
/// With a single sequential worker, any `processing` row present at batch
/// start belongs to an interrupted run.
pub async fn release_stale_claims(db: &Database) -> Result<usize, ReplyqError> {
    db.connection()
        .call(|conn| {
            let changed = conn.execute(
                "UPDATE queue SET status = 'pending' WHERE status = 'processing'",
                [],
            )?;
            Ok(changed)
        })
        .await
        .map_err(map_tr_err)
}

/// Operator bulk action: `pending -> cancelled`.
pub async fn cancel(db: &Database, ids: &[i64]) -> Result<usize, ReplyqError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let list = id_list(ids);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE queue SET status = 'cancelled',
                     processed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id IN ({list}) AND status = 'pending'"
                ),
                [],
            )?;
            Ok(changed)
        })
        .await
        .map_err(map_tr_err)
}

/// Operator bulk action: `failed -> pending` with `retry_count` reset.
///
/// The last error is kept so the operator can still see why the entry
/// failed previously.
pub async fn retry(db: &Database, ids: &[i64]) -> Result<usize, ReplyqError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let list = id_list(ids);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE queue SET status = 'pending', retry_count = 0,
                     processed_at = NULL
                     WHERE id IN ({list}) AND status = 'failed'"
                ),
                [],
            )?;
            Ok(changed)
        })
        .await
        .map_err(map_tr_err)
}

/// Operator bulk action: change priority of pending entries.
pub async fn set_priority(
    db: &Database,
    ids: &[i64],
    priority: i64,
) -> Result<usize, ReplyqError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let list = id_list(ids);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE queue SET priority = ?1
                     WHERE id IN ({list}) AND status = 'pending'"
                ),
                params![priority],
            )?;
            Ok(changed)
        })
        .await
        .map_err(map_tr_err)
}

/// Counts per status.
pub async fn stats(db: &Database) -> Result<QueueStats, ReplyqError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT status, COUNT(*) FROM queue GROUP BY status")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
            })?;

            let mut stats = QueueStats::default();
            for row in rows {
                let (status, count) = row?;
                match status.as_str() {
                    "pending" => stats.pending = count,
                    "processing" => stats.processing = count,
                    "completed" => stats.completed = count,
                    "failed" => stats.failed = count,
                    "cancelled" => stats.cancelled = count,
                    other => {
                        // Unknown status would mean schema drift; surface it.
                        return Err(conversion_err(
                            0,
                            std::io::Error::other(format!("unknown status {other:?}")),
                        )
                        .into());
                    }
                }
            }
            Ok(stats)
        })
        .await
        .map_err(map_tr_err)
}

/// List entries, newest first, optionally filtered by status.
pub async fn list(db: &Database, filter: &ListFilter) -> Result<Vec<QueueEntry>, ReplyqError> {
    let status = filter.status.map(|s| s.to_string());
    let limit = filter.limit.unwrap_or(100);

    db.connection()
        .call(move |conn| {
            let mut entries = Vec::new();
            match status {
                Some(s) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {ENTRY_COLUMNS} FROM queue WHERE status = ?1
                         ORDER BY id DESC LIMIT ?2"
                    ))?;
                    let rows = stmt.query_map(params![s, limit], row_to_entry)?;
                    for row in rows {
                        entries.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {ENTRY_COLUMNS} FROM queue ORDER BY id DESC LIMIT ?1"
                    ))?;
                    let rows = stmt.query_map(params![limit], row_to_entry)?;
                    for row in rows {
                        entries.push(row?);
                    }
                }
            }
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}
