// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands against the queue store: enqueue, stats, list, retry,
//! cancel, set-priority.
//!
//! These run without tracing; their output is the command's result.

use std::str::FromStr;

use replyq_config::model::ReplyqConfig;
use replyq_core::types::{
    EntrySource, EntryStatus, ListFilter, NewEntry, QueueEntry, ReplyPayload,
};
use replyq_core::{QueueStore, ReplyqError};
use replyq_store::SqliteQueueStore;

pub async fn enqueue(
    config: &ReplyqConfig,
    target: String,
    text: String,
    draft: Option<String>,
    source: &str,
    priority: Option<i64>,
) -> Result<(), ReplyqError> {
    let source = EntrySource::from_str(source).map_err(|_| {
        ReplyqError::Config(format!(
            "unknown source '{source}' (expected approved, manual, or backfill)"
        ))
    })?;
    let entry = NewEntry {
        target_id: target,
        payload: ReplyPayload {
            text,
            draft_id: draft,
        },
        source,
        priority,
    };

    let store = SqliteQueueStore::open(&config.queue.database_path).await?;
    let id = store.enqueue(&entry).await?;
    store.close().await?;

    println!("enqueued entry {id} (priority {})", entry.effective_priority());
    Ok(())
}

pub async fn stats(config: &ReplyqConfig, json: bool) -> Result<(), ReplyqError> {
    let store = SqliteQueueStore::open(&config.queue.database_path).await?;
    let stats = store.stats().await?;
    store.close().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!();
        println!("  replyq queue");
        println!("  {}", "-".repeat(35));
        println!("    Pending:    {}", stats.pending);
        println!("    Processing: {}", stats.processing);
        println!("    Completed:  {}", stats.completed);
        println!("    Failed:     {}", stats.failed);
        println!("    Cancelled:  {}", stats.cancelled);
        println!();
    }
    Ok(())
}

pub async fn list(
    config: &ReplyqConfig,
    status: Option<&str>,
    limit: i64,
) -> Result<(), ReplyqError> {
    let status = status
        .map(|s| {
            EntryStatus::from_str(s).map_err(|_| {
                ReplyqError::Config(format!(
                    "unknown status '{s}' (expected pending, processing, completed, \
                     failed, or cancelled)"
                ))
            })
        })
        .transpose()?;

    let store = SqliteQueueStore::open(&config.queue.database_path).await?;
    let entries = store
        .list(&ListFilter {
            status,
            limit: Some(limit),
        })
        .await?;
    store.close().await?;

    if entries.is_empty() {
        println!("no matching entries");
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_entry_line(entry));
    }
    Ok(())
}

pub async fn retry(config: &ReplyqConfig, ids: &[i64]) -> Result<(), ReplyqError> {
    let store = SqliteQueueStore::open(&config.queue.database_path).await?;
    let updated = store.retry(ids).await?;
    store.close().await?;
    println!("requeued {updated} of {} entries", ids.len());
    Ok(())
}

pub async fn cancel(config: &ReplyqConfig, ids: &[i64]) -> Result<(), ReplyqError> {
    let store = SqliteQueueStore::open(&config.queue.database_path).await?;
    let updated = store.cancel(ids).await?;
    store.close().await?;
    println!("cancelled {updated} of {} entries", ids.len());
    Ok(())
}

pub async fn set_priority(
    config: &ReplyqConfig,
    ids: &[i64],
    priority: i64,
) -> Result<(), ReplyqError> {
    let store = SqliteQueueStore::open(&config.queue.database_path).await?;
    let updated = store.set_priority(ids, priority).await?;
    store.close().await?;
    println!("updated {updated} of {} entries", ids.len());
    Ok(())
}

/// One line per entry: id, status, priority, retries, target, and a text
/// preview.
fn format_entry_line(entry: &QueueEntry) -> String {
    let error = entry
        .last_error
        .as_ref()
        .map(|e| format!(" [{}]", e.kind))
        .unwrap_or_default();
    format!(
        "#{:<6} {:<10} prio {:<4} retries {} target {} {}{}",
        entry.id,
        entry.status.to_string(),
        entry.priority,
        entry.retry_count,
        entry.target_id,
        preview(&entry.payload.text),
        error,
    )
}

/// Truncate reply text for single-line display.
fn preview(text: &str) -> String {
    const MAX: usize = 48;
    if text.chars().count() <= MAX {
        format!("{text:?}")
    } else {
        let cut: String = text.chars().take(MAX).collect();
        format!("{:?}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replyq_core::types::LastError;

    fn entry() -> QueueEntry {
        QueueEntry {
            id: 7,
            target_id: "190123".into(),
            payload: ReplyPayload {
                text: "thanks for sharing this".into(),
                draft_id: None,
            },
            source: EntrySource::Approved,
            priority: 5,
            status: EntryStatus::Pending,
            retry_count: 0,
            last_error: None,
            added_at: "2026-03-01T12:00:00.000Z".into(),
            processed_at: None,
        }
    }

    #[test]
    fn entry_line_shows_core_fields() {
        let line = format_entry_line(&entry());
        assert!(line.contains("#7"));
        assert!(line.contains("pending"));
        assert!(line.contains("prio 5"));
        assert!(line.contains("190123"));
        assert!(line.contains("thanks for sharing this"));
    }

    #[test]
    fn entry_line_shows_last_error_kind() {
        let mut e = entry();
        e.status = EntryStatus::Failed;
        e.last_error = Some(LastError {
            kind: replyq_core::types::ErrorKind::PermanentTargetGone,
            detail: "HTTP 403: deleted".into(),
        });
        let line = format_entry_line(&e);
        assert!(line.contains("failed"));
        assert!(line.contains("[permanent_target_gone]"));
    }

    #[test]
    fn long_text_is_truncated() {
        let mut e = entry();
        e.payload.text = "x".repeat(100);
        let line = format_entry_line(&e);
        assert!(line.contains("..."));
        assert!(line.len() < 150);
    }
}
