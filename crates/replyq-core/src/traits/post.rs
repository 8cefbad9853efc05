// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post capability: the external publishing operation.

use async_trait::async_trait;

use crate::error::ReplyqError;
use crate::types::{Credential, PostOutcome, ReplyPayload};

/// The external post operation: an opaque network call to the publishing
/// platform.
///
/// Implementations report every platform-level result -- including non-2xx
/// statuses, transport failures, and per-call timeouts -- as a [`PostOutcome`]
/// so the error classifier sees a uniform shape. `Err` is reserved for
/// failures to construct the request at all.
#[async_trait]
pub trait PostClient: Send + Sync {
    /// Post `payload` as a reply to `target_id` using `credential`.
    async fn post(
        &self,
        target_id: &str,
        payload: &ReplyPayload,
        credential: &Credential,
    ) -> Result<PostOutcome, ReplyqError>;
}
