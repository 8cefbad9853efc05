// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential issuer: the external token-refresh endpoint.

use async_trait::async_trait;

use crate::error::ReplyqError;
use crate::types::Credential;

/// Issues fresh credentials for the posting API.
///
/// Refreshes are idempotent; last-writer-wins is acceptable since refreshes
/// are infrequent and always produce a currently-valid credential.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// Obtain a fresh credential from the issuing endpoint.
    async fn refresh(&self) -> Result<Credential, ReplyqError>;
}
