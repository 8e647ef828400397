// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of settings.
//!
//! Collects every violation instead of failing on the first one.

use pushline_core::OperationKind;

use crate::diagnostic::ConfigError;
use crate::model::PushlineSettings;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate deserialized settings for semantic correctness.
pub fn validate_settings(settings: &PushlineSettings) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if settings.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    for kind in OperationKind::ALL {
        let max = settings.retry.max_retry_count(kind);
        if max < 0 {
            errors.push(ConfigError::Validation {
                message: format!("retry.{kind}_max_retries must be non-negative, got {max}"),
            });
        }
    }

    if settings.retry.backoff_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "retry.backoff_secs must be at least 1".to_string(),
        });
    }

    if settings.retry.max_backoff_secs < settings.retry.backoff_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "retry.max_backoff_secs ({}) must not be below retry.backoff_secs ({})",
                settings.retry.max_backoff_secs, settings.retry.backoff_secs
            ),
        });
    }

    if settings.retry.periodic_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "retry.periodic_interval_secs must be at least 1".to_string(),
        });
    }

    if settings.retry.retention_days == 0 {
        errors.push(ConfigError::Validation {
            message: "retry.retention_days must be at least 1".to_string(),
        });
    }

    if settings.network.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "network.timeout_secs must be at least 1".to_string(),
        });
    }

    if settings.foreground.window_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "foreground.window_timeout_secs must be at least 1".to_string(),
        });
    }

    let level = settings.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                settings.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
