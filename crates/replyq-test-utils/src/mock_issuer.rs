// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock credential issuer for lease manager and processor tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use replyq_core::types::Credential;
use replyq_core::{CredentialIssuer, ReplyqError};

/// A mock issuer handing out sequentially numbered tokens.
///
/// Records the instant of every refresh so tests can assert the 90-second
/// cadence, and can be flipped into a failing mode to exercise the
/// fatal-refresh path.
pub struct MockCredentialIssuer {
    refreshes: AtomicU64,
    refresh_times: Mutex<Vec<Instant>>,
    failing: AtomicBool,
}

impl MockCredentialIssuer {
    pub fn new() -> Self {
        Self {
            refreshes: AtomicU64::new(0),
            refresh_times: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// An issuer whose every refresh fails.
    pub fn failing() -> Self {
        let issuer = Self::new();
        issuer.failing.store(true, Ordering::SeqCst);
        issuer
    }

    /// Make subsequent refreshes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful refreshes performed.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Instants of every successful refresh.
    pub async fn refresh_times(&self) -> Vec<Instant> {
        self.refresh_times.lock().await.clone()
    }
}

impl Default for MockCredentialIssuer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialIssuer for MockCredentialIssuer {
    async fn refresh(&self) -> Result<Credential, ReplyqError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ReplyqError::Credential {
                message: "mock issuer configured to fail".into(),
                source: None,
            });
        }

        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        self.refresh_times.lock().await.push(Instant::now());
        Ok(Credential {
            access_token: format!("mock-token-{n}"),
            expires_at: None,
        })
    }
}
