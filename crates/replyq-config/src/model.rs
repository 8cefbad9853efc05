// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for replyq.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level replyq configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; only credentials must be supplied before `replyq run` works.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyqConfig {
    /// Process-level settings (logging).
    #[serde(default)]
    pub service: ServiceConfig,

    /// Queue store settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Batch processor pacing and halt thresholds.
    #[serde(default)]
    pub poster: PosterConfig,

    /// Posting platform API settings.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// OAuth credential refresh settings.
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Queue store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Attempt cap for retryable failures before an entry is marked failed.
    #[serde(default = "default_max_retries")]
    pub max_retries: i64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_database_path() -> String {
    "replyq.db".to_string()
}

fn default_max_retries() -> i64 {
    3
}

/// Batch processor pacing and halt thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PosterConfig {
    /// Minimum delay between posting operations, in seconds. Keeps the batch
    /// under the platform's per-window quota by construction.
    #[serde(default = "default_post_delay_secs")]
    pub post_delay_secs: u64,

    /// Maximum credential age during a batch before a synchronous refresh,
    /// in seconds. Credential lifetime is short relative to per-item
    /// processing time including the posting delay.
    #[serde(default = "default_credential_refresh_secs")]
    pub credential_refresh_secs: u64,

    /// Consecutive counted failures that trip the circuit breaker.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Default per-batch item budget for `replyq run`.
    #[serde(default = "default_batch_max_items")]
    pub batch_max_items: u32,

    /// Hard wall-clock cap on a batch, in seconds.
    #[serde(default = "default_batch_deadline_secs")]
    pub batch_deadline_secs: u64,

    /// The platform's quota window, in seconds. Used to compute the next
    /// permitted time when a 429 carries no reset hint (the platform resets
    /// on fixed clock boundaries).
    #[serde(default = "default_rate_window_secs")]
    pub rate_window_secs: u64,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            post_delay_secs: default_post_delay_secs(),
            credential_refresh_secs: default_credential_refresh_secs(),
            failure_threshold: default_failure_threshold(),
            batch_max_items: default_batch_max_items(),
            batch_deadline_secs: default_batch_deadline_secs(),
            rate_window_secs: default_rate_window_secs(),
        }
    }
}

fn default_post_delay_secs() -> u64 {
    45
}

fn default_credential_refresh_secs() -> u64 {
    90
}

fn default_failure_threshold() -> u32 {
    10
}

fn default_batch_max_items() -> u32 {
    50
}

fn default_batch_deadline_secs() -> u64 {
    1800
}

fn default_rate_window_secs() -> u64 {
    900
}

/// Posting platform API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    /// Base URL of the posting API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-call timeout for the post operation, in seconds. Distinct from
    /// the batch deadline; a timed-out call classifies as transient.
    #[serde(default = "default_post_timeout_secs")]
    pub post_timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            post_timeout_secs: default_post_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.x.com".to_string()
}

fn default_post_timeout_secs() -> u64 {
    30
}

/// OAuth credential refresh settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Token endpoint for the refresh-token grant.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// OAuth client id. `None` disables posting.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Initial refresh token. `None` disables posting. Rotated in memory as
    /// the issuer returns replacements.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            client_id: None,
            refresh_token: None,
        }
    }
}

fn default_token_url() -> String {
    "https://api.x.com/2/oauth2/token".to_string()
}
