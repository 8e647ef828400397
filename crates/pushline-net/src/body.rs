// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON request bodies.

use pushline_core::{
    AppInfo, AuthContext, DeviceToken, MobileEventRow, PushEventRow, PushProvider, SubscribeRow,
    TokenUpdateRow, UtmTags,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct SubscribeBody<'a> {
    pub uid: &'a str,
    pub matching: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_provider: Option<PushProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_token: Option<&'a str>,
    pub sync: bool,
    pub replace: bool,
    pub skip_triggers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_fields: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cats: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_info: Option<&'a AppInfo>,
    pub created_at: &'a str,
}

impl<'a> SubscribeBody<'a> {
    pub fn new(
        auth: &'a AuthContext,
        row: &'a SubscribeRow,
        token: Option<&'a DeviceToken>,
        app_info: Option<&'a AppInfo>,
    ) -> Self {
        Self {
            uid: &row.uid,
            matching: auth.matching_mode.as_str(),
            push_provider: token.map(|t| t.provider),
            push_token: token.map(|t| t.token.as_str()),
            sync: row.sync,
            replace: row.replace,
            skip_triggers: row.skip_triggers,
            profile_fields: row.profile_fields.as_ref(),
            custom_fields: row.custom_fields.as_ref(),
            cats: row.cats.as_deref(),
            app_info,
            created_at: &row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenUpdateBody<'a> {
    pub uid: &'a str,
    pub matching: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_provider: Option<PushProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_token: Option<&'a str>,
    pub new_provider: PushProvider,
    pub new_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_info: Option<&'a AppInfo>,
}

impl<'a> TokenUpdateBody<'a> {
    pub fn new(
        auth: &'a AuthContext,
        row: &'a TokenUpdateRow,
        app_info: Option<&'a AppInfo>,
    ) -> Self {
        Self {
            uid: &row.uid,
            matching: auth.matching_mode.as_str(),
            old_provider: row.old_provider,
            old_token: row.old_token.as_deref(),
            new_provider: row.new_provider,
            new_token: &row.new_token,
            app_info,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PushEventBody<'a> {
    pub uid: &'a str,
    pub created_at: &'a str,
}

impl<'a> From<&'a PushEventRow> for PushEventBody<'a> {
    fn from(row: &'a PushEventRow) -> Self {
        Self {
            uid: &row.message_uid,
            created_at: &row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MobileEventBody<'a> {
    pub uid: &'a str,
    pub matching: &'a str,
    pub event: &'a str,
    pub sid: &'a str,
    pub time_zone: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_fields: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_fields: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sm_id: Option<&'a str>,
    pub utm: &'a UtmTags,
    pub created_at: &'a str,
}

impl<'a> MobileEventBody<'a> {
    pub fn new(auth: &'a AuthContext, row: &'a MobileEventRow) -> Self {
        Self {
            uid: &row.uid,
            matching: auth.matching_mode.as_str(),
            event: &row.event_name,
            sid: &row.sid,
            time_zone: row.time_zone,
            alt_id: row.alt_id.as_deref(),
            payload: row.payload.as_ref(),
            matching_fields: row.matching.as_ref(),
            profile_fields: row.profile_fields.as_ref(),
            sm_id: row.sm_id.as_deref(),
            utm: &row.utm,
            created_at: &row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use pushline_core::{MatchingMode, SubscriptionStatus};
    use serde_json::json;

    use super::*;

    fn auth() -> AuthContext {
        AuthContext {
            header: "Bearer rtoken@x".into(),
            matching_mode: MatchingMode::RToken,
            user_tag: "tag".into(),
        }
    }

    #[test]
    fn subscribe_body_omits_absent_fields() {
        let row = SubscribeRow {
            id: 1,
            uid: "u-1".into(),
            user_tag: "tag".into(),
            status: SubscriptionStatus::Subscribed,
            sync: true,
            profile_fields: None,
            custom_fields: Some(json!({"tier": "gold"})),
            cats: None,
            replace: false,
            skip_triggers: false,
            retry_count: 0,
            max_retry_count: 1,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };
        let token = DeviceToken {
            provider: PushProvider::Huawei,
            token: "hms".into(),
        };
        let auth = auth();
        let value =
            serde_json::to_value(SubscribeBody::new(&auth, &row, Some(&token), None)).unwrap();
        assert_eq!(value["matching"], "push");
        assert_eq!(value["push_provider"], "android-huawei");
        assert_eq!(value["custom_fields"]["tier"], "gold");
        assert!(value.get("profile_fields").is_none());
        assert!(value.get("app_info").is_none());
    }
}
