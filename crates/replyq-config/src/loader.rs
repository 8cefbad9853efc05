// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./replyq.toml` > `~/.config/replyq/replyq.toml` >
//! `/etc/replyq/replyq.toml`, with environment variable overrides via the
//! `REPLYQ_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ReplyqConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/replyq/replyq.toml` (system-wide)
/// 3. `~/.config/replyq/replyq.toml` (user XDG config)
/// 4. `./replyq.toml` (local directory)
/// 5. `REPLYQ_*` environment variables
pub fn load_config() -> Result<ReplyqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReplyqConfig::default()))
        .merge(Toml::file("/etc/replyq/replyq.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("replyq/replyq.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("replyq.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ReplyqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReplyqConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ReplyqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReplyqConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `REPLYQ_QUEUE_DATABASE_PATH` must map to
/// `queue.database_path`, not `queue.database.path`.
fn env_provider() -> Env {
    Env::prefixed("REPLYQ_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("queue_", "queue.", 1)
            .replacen("poster_", "poster.", 1)
            .replacen("platform_", "platform.", 1)
            .replacen("credentials_", "credentials.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.poster.post_delay_secs, 45);
        assert_eq!(config.platform.api_base_url, "https://api.x.com");
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [poster]
            post_delay_secs = 1
            failure_threshold = 2

            [credentials]
            client_id = "cid"
            refresh_token = "rt"
            "#,
        )
        .unwrap();
        assert_eq!(config.poster.post_delay_secs, 1);
        assert_eq!(config.poster.failure_threshold, 2);
        assert_eq!(config.credentials.client_id.as_deref(), Some("cid"));
        // Untouched sections keep defaults.
        assert_eq!(config.queue.max_retries, 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [poster]
            post_delay = 45
            "#,
        );
        assert!(result.is_err(), "unknown key should be rejected");
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let result = load_config_from_str("[posting]\n");
        assert!(result.is_err(), "unknown section should be rejected");
    }
}
