// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock post client for deterministic batch processor tests.
//!
//! Outcomes are popped from a FIFO queue. When the queue is empty, a
//! successful outcome is returned. Every call is recorded with its timestamp
//! and the credential it carried, so tests can assert pacing and
//! refresh-cadence behavior.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use replyq_core::types::{Credential, PostOutcome, ReplyPayload};
use replyq_core::{PostClient, ReplyqError};

/// One recorded call to [`MockPostClient::post`].
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub at: Instant,
    pub target_id: String,
    pub access_token: String,
}

/// A mock post client returning pre-scripted outcomes.
pub struct MockPostClient {
    outcomes: Arc<Mutex<VecDeque<PostOutcome>>>,
    calls: Arc<Mutex<Vec<RecordedPost>>>,
}

impl MockPostClient {
    /// Create a mock with an empty outcome queue (every post succeeds).
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock pre-loaded with the given outcomes.
    pub fn with_outcomes(outcomes: Vec<PostOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append an outcome to the script.
    pub async fn push_outcome(&self, outcome: PostOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// All calls recorded so far.
    pub async fn calls(&self) -> Vec<RecordedPost> {
        self.calls.lock().await.clone()
    }

    /// Number of post attempts made.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

impl Default for MockPostClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostClient for MockPostClient {
    async fn post(
        &self,
        target_id: &str,
        _payload: &ReplyPayload,
        credential: &Credential,
    ) -> Result<PostOutcome, ReplyqError> {
        self.calls.lock().await.push(RecordedPost {
            at: Instant::now(),
            target_id: target_id.to_string(),
            access_token: credential.access_token.clone(),
        });

        let outcome = self
            .outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| PostOutcome::success(format!("mock-post-{target_id}")));
        Ok(outcome)
    }
}
