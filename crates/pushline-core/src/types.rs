// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the store, the gateway, and the delivery core.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::PushlineError;

/// The four independently serialized delivery streams.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Subscribe,
    TokenUpdate,
    PushEvent,
    MobileEvent,
}

impl OperationKind {
    /// Every kind, in the fixed order used when all kind locks are taken.
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Subscribe,
        OperationKind::TokenUpdate,
        OperationKind::PushEvent,
        OperationKind::MobileEvent,
    ];

    /// Position of the kind inside [`OperationKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            OperationKind::Subscribe => 0,
            OperationKind::TokenUpdate => 1,
            OperationKind::PushEvent => 2,
            OperationKind::MobileEvent => 3,
        }
    }

    /// Unique-work tag for the one-shot retry task of this kind.
    pub fn retry_tag(self) -> String {
        format!("pushline.retry.{self}")
    }

    /// Unique-work tag for the periodic retry task of this kind.
    pub fn periodic_tag(self) -> String {
        format!("pushline.periodic.{self}")
    }
}

/// Push-subscription status requested by the host application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Subscribed,
    Suspended,
    Unsubscribed,
}

/// Delivery-report type for a received push message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PushEventType {
    Delivery,
    Open,
}

/// Push vendors that can hand out a device token.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum PushProvider {
    #[strum(serialize = "android-firebase")]
    #[serde(rename = "android-firebase")]
    Firebase,
    #[strum(serialize = "android-huawei")]
    #[serde(rename = "android-huawei")]
    Huawei,
    #[strum(serialize = "android-rustore")]
    #[serde(rename = "android-rustore")]
    RuStore,
}

/// Identity-correlation scheme used to attribute a request to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchingMode {
    /// Static resource token configured by the host application.
    RToken,
    /// Mode named by the `matching` claim of a JWT.
    Claim(String),
}

impl MatchingMode {
    /// Wire name of the matching mode.
    pub fn as_str(&self) -> &str {
        match self {
            MatchingMode::RToken => "push",
            MatchingMode::Claim(mode) => mode,
        }
    }
}

/// Resolved identity for one outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Value of the `Authorization` header.
    pub header: String,
    pub matching_mode: MatchingMode,
    /// Stable identifier of the user the request belongs to.
    pub user_tag: String,
}

/// Application metadata reported with every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub app_id: String,
    pub app_iid: String,
    pub app_ver: String,
}

/// Notification channel presented by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub name: String,
    pub description: String,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self {
            name: "pushline_default".to_string(),
            description: "Pushline notifications".to_string(),
        }
    }
}

/// The persisted configuration entity.
///
/// Created by `initialize`, overwritten wholesale on re-configuration and
/// destroyed by `clear`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushConfiguration {
    /// Base URL of the marketing API.
    pub api_url: String,
    /// Static resource token. Takes priority over any JWT.
    #[serde(default)]
    pub r_token: Option<String>,
    #[serde(default)]
    pub app_info: Option<AppInfo>,
    #[serde(default)]
    pub notification_channel: NotificationChannel,
    /// Vendors to ask for a device token, most preferred first.
    #[serde(default)]
    pub provider_priority: Vec<PushProvider>,
    #[serde(default)]
    pub use_foreground_bridge: bool,
    /// Text of the visible indicator shown while a foreground window is held.
    #[serde(default)]
    pub foreground_message: Option<String>,
}

impl PushConfiguration {
    /// Creates a configuration with defaults for everything but the API URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            r_token: None,
            app_info: None,
            notification_channel: NotificationChannel::default(),
            provider_priority: Vec::new(),
            use_foreground_bridge: false,
            foreground_message: None,
        }
    }

    /// Checks the invariants `initialize` relies on.
    pub fn validate(&self) -> Result<(), PushlineError> {
        let url = self.api_url.trim();
        if url.is_empty() {
            return Err(PushlineError::Validation("api_url must not be empty".into()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PushlineError::Validation(format!(
                "api_url `{url}` must use http or https"
            )));
        }
        let mut seen = Vec::with_capacity(self.provider_priority.len());
        for provider in &self.provider_priority {
            if seen.contains(provider) {
                return Err(PushlineError::Validation(format!(
                    "provider `{provider}` listed twice in provider_priority"
                )));
            }
            seen.push(*provider);
        }
        Ok(())
    }
}

/// Device token last confirmed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceToken {
    pub provider: PushProvider,
    pub token: String,
}

/// UTM tags attached to a mobile event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmTags {
    pub campaign: Option<String>,
    pub content: Option<String>,
    pub keyword: Option<String>,
    pub medium: Option<String>,
    pub source: Option<String>,
    pub temp: Option<String>,
}

/// A pending subscribe/suspend/unsubscribe intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeRow {
    pub id: i64,
    pub uid: String,
    pub user_tag: String,
    pub status: SubscriptionStatus,
    /// Whether the server should answer with the resulting profile.
    pub sync: bool,
    pub profile_fields: Option<Value>,
    pub custom_fields: Option<Value>,
    pub cats: Option<Vec<String>>,
    pub replace: bool,
    pub skip_triggers: bool,
    pub retry_count: i64,
    pub max_retry_count: i64,
    pub created_at: String,
}

/// A pending token change that must be confirmed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUpdateRow {
    pub id: i64,
    pub uid: String,
    pub old_provider: Option<PushProvider>,
    pub old_token: Option<String>,
    pub new_provider: PushProvider,
    pub new_token: String,
    pub retry_count: i64,
    pub max_retry_count: i64,
    pub created_at: String,
}

/// A pending delivery or open report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEventRow {
    pub id: i64,
    pub message_uid: String,
    pub event_type: PushEventType,
    pub retry_count: i64,
    pub max_retry_count: i64,
    pub created_at: String,
}

/// A pending custom analytics event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileEventRow {
    pub id: i64,
    pub uid: String,
    pub user_tag: String,
    /// Offset from UTC in minutes.
    pub time_zone: i32,
    /// Stream (pixel) identifier.
    pub sid: String,
    /// Client-side alternative identifier.
    pub alt_id: Option<String>,
    pub event_name: String,
    pub payload: Option<Value>,
    pub matching: Option<Value>,
    pub profile_fields: Option<Value>,
    /// Send-message id the event is attributed to.
    pub sm_id: Option<String>,
    pub utm: UtmTags,
    pub retry_count: i64,
    pub max_retry_count: i64,
    pub created_at: String,
}

/// Returns `true` when a failed attempt must drop the row instead of
/// incrementing its counter.
pub fn is_retry_limit(retry_count: i64, max_retry_count: i64) -> bool {
    retry_count >= max_retry_count
}

/// Counter value after one more failed attempt, or `None` when the row has
/// exhausted its retries and must be deleted.
pub fn next_retry_count(retry_count: i64, max_retry_count: i64) -> Option<i64> {
    if is_retry_limit(retry_count, max_retry_count) {
        None
    } else {
        Some(retry_count + 1)
    }
}

/// Current UTC time in the millisecond ISO 8601 form stored in every row.
pub fn now_timestamp() -> String {
    format_timestamp(chrono::Utc::now())
}

/// Timestamp `days` days ago, in the same format as [`now_timestamp`].
pub fn timestamp_days_ago(days: u32) -> String {
    let now = chrono::Utc::now();
    let then = now
        .checked_sub_signed(chrono::TimeDelta::days(i64::from(days)))
        .unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC);
    format_timestamp(then)
}

fn format_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
