// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pushline: the reliable-delivery core of a push-notification SDK.
//!
//! Build an instance with [`Pushline::builder`], call
//! [`Pushline::initialize`] once with the API configuration, and subscribe
//! an [`EventSink`] to receive the result of every operation.
//!
//! Outbound requests (subscriptions, token changes, delivery reports and
//! analytics events) are persisted before they are sent and retried in the
//! background until the server confirms or rejects them, or until they
//! run out of retries.

pub mod builder;
pub mod requests;
pub mod sdk;

pub use builder::PushlineBuilder;
pub use requests::{MobileEventRequest, SubscribeOptions};
pub use sdk::Pushline;

pub use pushline_config::PushlineSettings;
pub use pushline_core::{
    AppInfo, DeviceToken, EventCode, EventKind, EventSink, ForegroundHost, JwtProvider,
    NotificationChannel, OperationKind, PushConfiguration, PushEventType, PushProvider,
    PushlineError, SdkEvent, TokenProvider, UtmTags,
};
pub use pushline_delivery::{Connectivity, KindState, PassSummary};
