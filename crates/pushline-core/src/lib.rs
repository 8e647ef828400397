// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Pushline delivery core.
//!
//! This crate provides the error type, the persisted domain types, SDK
//! events, and the collaborator traits (store, gateway, task scheduler,
//! foreground host, identity sources) that the rest of the workspace
//! implements or consumes.

pub mod error;
pub mod events;
pub mod traits;
pub mod types;
pub mod work;

// Re-export key items at crate root for ergonomic imports.
pub use error::PushlineError;
pub use events::{EventCode, EventKind, RequestOutcome, SdkEvent};
pub use types::{
    is_retry_limit, next_retry_count, now_timestamp, timestamp_days_ago, AppInfo, AuthContext,
    DeviceToken, MatchingMode, MobileEventRow, NotificationChannel, OperationKind,
    PushConfiguration, PushEventRow, PushEventType, PushProvider, SubscribeRow,
    SubscriptionStatus, TokenUpdateRow, UtmTags,
};
pub use work::{ExistingWorkPolicy, WorkRequest, WorkResult};

pub use traits::{
    EventSink, ForegroundHost, JwtProvider, PushGateway, PushStore, TaskHandler, TaskScheduler,
    TokenProvider,
};
