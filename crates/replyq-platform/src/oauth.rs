// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OAuth2 refresh-token client, the [`CredentialIssuer`] implementation.
//!
//! The platform rotates refresh tokens: every grant may return a replacement,
//! which must be used for the next refresh. The current refresh token is held
//! behind a mutex and swapped on rotation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use replyq_core::types::Credential;
use replyq_core::{CredentialIssuer, ReplyqError};

use crate::types::TokenResponse;

/// Per-call timeout for token refreshes.
const REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth2 token endpoint client.
pub struct TokenClient {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    refresh_token: Mutex<String>,
}

impl TokenClient {
    /// Creates a token client seeded with the operator-provisioned refresh
    /// token.
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<Self, ReplyqError> {
        let client = reqwest::Client::builder()
            .timeout(REFRESH_TIMEOUT)
            .build()
            .map_err(|e| ReplyqError::Credential {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            refresh_token: Mutex::new(refresh_token.into()),
        })
    }
}

#[async_trait]
impl CredentialIssuer for TokenClient {
    async fn refresh(&self) -> Result<Credential, ReplyqError> {
        // Hold the lock across the exchange so concurrent refreshes cannot
        // both spend the same (single-use) refresh token.
        let mut refresh_token = self.refresh_token.lock().await;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", self.client_id.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ReplyqError::Credential {
                message: format!("token refresh request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReplyqError::Credential {
                message: format!("token endpoint returned {status}: {body}"),
                source: None,
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ReplyqError::Credential {
                message: format!("failed to parse token response: {e}"),
                source: Some(Box::new(e)),
            }
        })?;

        if let Some(rotated) = token.refresh_token {
            debug!("refresh token rotated by issuer");
            *refresh_token = rotated;
        }

        let expires_at = token
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));

        info!("credential refreshed");
        Ok(Credential {
            access_token: token.access_token,
            expires_at,
        })
    }
}
