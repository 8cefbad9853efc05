// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the posting platform API.

use serde::{Deserialize, Serialize};

/// Request body for creating a reply post.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePostRequest {
    pub text: String,
    pub reply: ReplySettings,
}

/// Reply threading settings.
#[derive(Debug, Clone, Serialize)]
pub struct ReplySettings {
    pub in_reply_to_tweet_id: String,
}

/// Successful creation response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostResponse {
    pub data: CreatedPost,
}

/// The created post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPost {
    pub id: String,
}

/// Error body shape returned by the platform.
///
/// All fields are optional; error responses are not uniform across
/// endpoints, so anything missing degrades to the raw body text.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiErrorResponse {
    /// Fold title and detail into a single human-readable message.
    pub fn message(&self) -> Option<String> {
        match (&self.title, &self.detail) {
            (Some(title), Some(detail)) => Some(format!("{title}: {detail}")),
            (Some(title), None) => Some(title.clone()),
            (None, Some(detail)) => Some(detail.clone()),
            (None, None) => None,
        }
    }
}

/// Response from the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Seconds until expiry, when the issuer reports one.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Replacement refresh token. The platform rotates refresh tokens on
    /// every grant.
    #[serde(default)]
    pub refresh_token: Option<String>,
}
