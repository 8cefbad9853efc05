// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential lease manager.
//!
//! Credential lifetime is short relative to per-item processing time (the
//! posting delay alone is half the lease), so the manager refreshes
//! synchronously whenever the held credential exceeds `max_age`. Refresh
//! failure is fatal to the batch; it cannot be recovered item-by-item.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use replyq_core::types::Credential;
use replyq_core::{CredentialIssuer, ReplyqError};

pub struct CredentialLeaseManager {
    issuer: Arc<dyn CredentialIssuer>,
    max_age: Duration,
    current: Option<Credential>,
    last_refresh: Option<Instant>,
}

impl CredentialLeaseManager {
    pub fn new(issuer: Arc<dyn CredentialIssuer>, max_age: Duration) -> Self {
        Self {
            issuer,
            max_age,
            current: None,
            last_refresh: None,
        }
    }

    /// Refresh unconditionally. Used at batch start so the batch never runs
    /// on a credential of unknown age.
    pub async fn force_refresh(&mut self) -> Result<Credential, ReplyqError> {
        let credential = self.issuer.refresh().await?;
        debug!(expires_at = ?credential.expires_at, "credential refreshed");
        self.current = Some(credential.clone());
        self.last_refresh = Some(Instant::now());
        Ok(credential)
    }

    /// Return the held credential, refreshing first if it is older than
    /// `max_age` (or absent).
    pub async fn refresh_if_stale(&mut self) -> Result<Credential, ReplyqError> {
        match (&self.current, self.last_refresh) {
            (Some(credential), Some(at)) if at.elapsed() < self.max_age => Ok(credential.clone()),
            _ => self.force_refresh().await,
        }
    }
}
