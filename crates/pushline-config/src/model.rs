// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! keys at startup.

use std::time::Duration;

use pushline_core::OperationKind;
use serde::{Deserialize, Serialize};

/// Top-level settings. Every section is optional and defaults sensibly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PushlineSettings {
    /// Durable local store settings.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Retry limits and scheduling intervals.
    #[serde(default)]
    pub retry: RetrySettings,

    /// HTTP client settings.
    #[serde(default)]
    pub network: NetworkSettings,

    /// Foreground execution window settings.
    #[serde(default)]
    pub foreground: ForegroundSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Durable local store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSettings {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("pushline").join("pushline.db"))
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| "pushline.db".to_string())
}

fn default_true() -> bool {
    true
}

/// Retry limits and scheduling intervals.
///
/// `max_retry_count` values are copied into each row at creation and never
/// change afterwards for that row.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    #[serde(default = "default_subscribe_max_retries")]
    pub subscribe_max_retries: i64,

    #[serde(default = "default_token_update_max_retries")]
    pub token_update_max_retries: i64,

    #[serde(default = "default_push_event_max_retries")]
    pub push_event_max_retries: i64,

    #[serde(default = "default_mobile_event_max_retries")]
    pub mobile_event_max_retries: i64,

    /// Minimum delay before a one-shot retry task runs.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// Ceiling for the exponential backoff between failed task runs.
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,

    /// Interval of the periodic drain task.
    #[serde(default = "default_periodic_interval_secs")]
    pub periodic_interval_secs: u64,

    /// Age after which confirmed delivery reports are forgotten and pending
    /// rows of a previous user are dropped.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl RetrySettings {
    /// Retry ceiling for new rows of `kind`.
    pub fn max_retry_count(&self, kind: OperationKind) -> i64 {
        match kind {
            OperationKind::Subscribe => self.subscribe_max_retries,
            OperationKind::TokenUpdate => self.token_update_max_retries,
            OperationKind::PushEvent => self.push_event_max_retries,
            OperationKind::MobileEvent => self.mobile_event_max_retries,
        }
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }

    pub fn periodic_interval(&self) -> Duration {
        Duration::from_secs(self.periodic_interval_secs)
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            subscribe_max_retries: default_subscribe_max_retries(),
            token_update_max_retries: default_token_update_max_retries(),
            push_event_max_retries: default_push_event_max_retries(),
            mobile_event_max_retries: default_mobile_event_max_retries(),
            backoff_secs: default_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            periodic_interval_secs: default_periodic_interval_secs(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_subscribe_max_retries() -> i64 {
    15
}

fn default_token_update_max_retries() -> i64 {
    15
}

fn default_push_event_max_retries() -> i64 {
    15
}

fn default_mobile_event_max_retries() -> i64 {
    15
}

fn default_backoff_secs() -> u64 {
    30
}

fn default_max_backoff_secs() -> u64 {
    3600
}

// Platform schedulers refuse periodic work more frequent than 15 minutes.
fn default_periodic_interval_secs() -> u64 {
    900
}

fn default_retention_days() -> u32 {
    30
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSettings {
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl NetworkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("pushline/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Foreground execution window settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ForegroundSettings {
    /// Hard ceiling after which a window is released even if work hangs.
    #[serde(default = "default_window_timeout_secs")]
    pub window_timeout_secs: u64,

    /// Indicator text used when the configuration entity sets none.
    #[serde(default = "default_foreground_message")]
    pub default_message: String,
}

impl ForegroundSettings {
    pub fn window_timeout(&self) -> Duration {
        Duration::from_secs(self.window_timeout_secs)
    }
}

impl Default for ForegroundSettings {
    fn default() -> Self {
        Self {
            window_timeout_secs: default_window_timeout_secs(),
            default_message: default_foreground_message(),
        }
    }
}

fn default_window_timeout_secs() -> u64 {
    60
}

fn default_foreground_message() -> String {
    "Sending notification data".to_string()
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
