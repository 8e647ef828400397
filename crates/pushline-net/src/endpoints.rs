// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! API paths, relative to the configured `api_url`.

use pushline_core::{PushEventType, SubscriptionStatus};

pub const SUBSCRIBE: &str = "/subscription/push/subscribe/";
pub const SUSPEND: &str = "/subscription/push/suspend/";
pub const UNSUBSCRIBE: &str = "/subscription/push/unsubscribe/";
pub const TOKEN_UPDATE: &str = "/subscription/push/update/";
pub const PUSH_DELIVER: &str = "/event/push/deliver/";
pub const PUSH_OPEN: &str = "/event/push/open/";
pub const MOBILE_EVENT: &str = "/event/post/";

pub fn for_status(status: SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Subscribed => SUBSCRIBE,
        SubscriptionStatus::Suspended => SUSPEND,
        SubscriptionStatus::Unsubscribed => UNSUBSCRIBE,
    }
}

pub fn for_push_event(event_type: PushEventType) -> &'static str {
    match event_type {
        PushEventType::Delivery => PUSH_DELIVER,
        PushEventType::Open => PUSH_OPEN,
    }
}

/// Join a base URL and an API path without doubling the slash.
pub fn join(api_url: &str, path: &str) -> String {
    format!("{}{}", api_url.trim().trim_end_matches('/'), path)
}
