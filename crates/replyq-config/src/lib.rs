// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for replyq.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! let config = replyq_config::load_and_validate().expect("config errors");
//! println!("database: {}", config.queue.database_path);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ReplyqConfig;
pub use validation::{validate_credentials, ConfigError};

/// Print every configuration problem to stderr, one per line.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("config error: {error}");
    }
}

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a usable `ReplyqConfig` or every problem found, so the
/// operator can fix the config in one pass.
pub fn load_and_validate() -> Result<ReplyqConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Load(err)]),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<ReplyqConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Load(err)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_validate_str_catches_value_errors() {
        let result = load_and_validate_str(
            r#"
            [poster]
            post_delay_secs = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn load_and_validate_str_accepts_good_config() {
        let config = load_and_validate_str(
            r#"
            [queue]
            database_path = "/tmp/replyq-test.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.queue.database_path, "/tmp/replyq-test.db");
    }
}
