// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation with actionable messages.

use thiserror::Error;

use crate::model::ReplyqConfig;

/// A configuration problem found at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML / env layer failed to parse or merge.
    #[error("{0}")]
    Load(#[from] figment::Error),

    /// A field parsed but carries an unusable value.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Check value-level constraints Figment cannot express.
///
/// Collects every problem rather than stopping at the first, so the operator
/// fixes the config in one pass.
pub fn validate_config(config: &ReplyqConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.queue.database_path.trim().is_empty() {
        errors.push(ConfigError::Invalid {
            field: "queue.database_path",
            reason: "must not be empty".into(),
        });
    }
    if config.queue.max_retries < 1 {
        errors.push(ConfigError::Invalid {
            field: "queue.max_retries",
            reason: format!("must be at least 1, got {}", config.queue.max_retries),
        });
    }
    if config.poster.post_delay_secs == 0 {
        errors.push(ConfigError::Invalid {
            field: "poster.post_delay_secs",
            reason: "must be non-zero; the inter-post delay is what keeps the batch \
                     under the platform quota"
                .into(),
        });
    }
    if config.poster.credential_refresh_secs == 0 {
        errors.push(ConfigError::Invalid {
            field: "poster.credential_refresh_secs",
            reason: "must be non-zero".into(),
        });
    }
    if config.poster.failure_threshold == 0 {
        errors.push(ConfigError::Invalid {
            field: "poster.failure_threshold",
            reason: "must be at least 1".into(),
        });
    }
    if config.poster.batch_max_items == 0 {
        errors.push(ConfigError::Invalid {
            field: "poster.batch_max_items",
            reason: "must be at least 1".into(),
        });
    }
    if config.poster.rate_window_secs == 0 {
        errors.push(ConfigError::Invalid {
            field: "poster.rate_window_secs",
            reason: "must be non-zero".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that the credential fields needed for posting are present.
///
/// Separate from [`validate_config`] because read-only commands (`stats`,
/// `list`) work without credentials.
pub fn validate_credentials(config: &ReplyqConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.credentials.client_id.is_none() {
        errors.push(ConfigError::Invalid {
            field: "credentials.client_id",
            reason: "required for `replyq run` (set REPLYQ_CREDENTIALS_CLIENT_ID)".into(),
        });
    }
    if config.credentials.refresh_token.is_none() {
        errors.push(ConfigError::Invalid {
            field: "credentials.refresh_token",
            reason: "required for `replyq run` (set REPLYQ_CREDENTIALS_REFRESH_TOKEN)".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ReplyqConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_delay_is_rejected() {
        let mut config = ReplyqConfig::default();
        config.poster.post_delay_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("post_delay_secs"));
    }

    #[test]
    fn all_problems_reported_at_once() {
        let mut config = ReplyqConfig::default();
        config.poster.post_delay_secs = 0;
        config.poster.failure_threshold = 0;
        config.queue.max_retries = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn credentials_required_for_run() {
        let config = ReplyqConfig::default();
        let errors = validate_credentials(&config).unwrap_err();
        assert_eq!(errors.len(), 2);

        let mut config = ReplyqConfig::default();
        config.credentials.client_id = Some("cid".into());
        config.credentials.refresh_token = Some("rt".into());
        assert!(validate_credentials(&config).is_ok());
    }
}
