// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the replyq posting queue engine.

use thiserror::Error;

/// The primary error type used across all replyq crates and adapter traits.
#[derive(Debug, Error)]
pub enum ReplyqError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Queue store errors (database connection, query failure, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Posting platform errors that are not expressible as a classified
    /// outcome (request construction, response decoding).
    #[error("platform error: {message}")]
    Platform {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Credential refresh failed. Fatal to a running batch -- the caller
    /// must resolve credentials out-of-band.
    #[error("credential error: {message}")]
    Credential {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
