// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `replyq run` command implementation.
//!
//! Wires the store, the platform clients, and the engine together and runs
//! one posting batch.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use replyq_config::model::ReplyqConfig;
use replyq_core::types::BatchSummary;
use replyq_core::{QueueStore, ReplyqError};
use replyq_engine::{
    BatchProcessor, CredentialLeaseManager, RateGovernor, StatusNotifier,
};
use replyq_platform::{PlatformClient, TokenClient};
use replyq_store::SqliteQueueStore;

/// Run one posting batch and print its summary.
pub async fn run_batch(
    config: &ReplyqConfig,
    max_items: Option<u32>,
) -> Result<(), ReplyqError> {
    init_tracing(&config.service.log_level);

    if let Err(errors) = replyq_config::validate_credentials(config) {
        replyq_config::render_errors(&errors);
        return Err(ReplyqError::Config(
            "posting credentials are not configured".into(),
        ));
    }
    // validate_credentials guarantees these are set.
    let client_id = config.credentials.client_id.clone().ok_or_else(|| {
        ReplyqError::Config("credentials.client_id is required".into())
    })?;
    let refresh_token = config.credentials.refresh_token.clone().ok_or_else(|| {
        ReplyqError::Config("credentials.refresh_token is required".into())
    })?;

    let store = Arc::new(SqliteQueueStore::open(&config.queue.database_path).await?);

    // Any processing row at startup is an orphan from an interrupted run.
    let released = store.release_stale_claims().await?;
    if released > 0 {
        warn!(released, "released stale processing claims");
    }

    let client = Arc::new(PlatformClient::new(
        &config.platform.api_base_url,
        Duration::from_secs(config.platform.post_timeout_secs),
    )?);
    let issuer = Arc::new(TokenClient::new(
        &config.credentials.token_url,
        client_id,
        refresh_token,
    )?);

    let lease = CredentialLeaseManager::new(
        issuer,
        Duration::from_secs(config.poster.credential_refresh_secs),
    );
    let governor = RateGovernor::new(
        Duration::from_secs(config.poster.post_delay_secs),
        Duration::from_secs(config.poster.rate_window_secs),
    );

    let mut processor = BatchProcessor::new(
        store.clone(),
        client,
        lease,
        governor,
        StatusNotifier::new(),
        config.poster.failure_threshold,
        config.queue.max_retries,
    );

    let max_items = max_items.unwrap_or(config.poster.batch_max_items);
    let deadline = Instant::now() + Duration::from_secs(config.poster.batch_deadline_secs);
    let summary = processor.run_batch(max_items, deadline).await?;

    store.close().await?;
    print!("{}", format_summary(&summary));
    Ok(())
}

/// Render a batch summary for the operator.
fn format_summary(summary: &BatchSummary) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str("  replyq batch\n");
    out.push_str(&format!("  {}\n", "-".repeat(35)));
    out.push_str(&format!("    Attempted:  {}\n", summary.attempted));
    out.push_str(&format!("    Completed:  {}\n", summary.completed));
    out.push_str(&format!("    Duplicates: {}\n", summary.duplicates));
    out.push_str(&format!("    Requeued:   {}\n", summary.requeued));
    out.push_str(&format!("    Failed:     {}\n", summary.failed));
    out.push_str(&format!("    Halted:     {}\n", summary.halt));
    if let Some(resume_at) = summary.resume_at {
        out.push_str(&format!("    Resume at:  {}\n", resume_at.to_rfc3339()));
    }
    out.push('\n');
    out
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("replyq={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
