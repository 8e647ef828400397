// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SDK events and the tri-state request outcome.
//!
//! Every result the host application sees travels as an [`SdkEvent`]. Codes
//! are explicit `(code, message)` pairs from [`EventCode`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;
use uuid::Uuid;

use crate::types::OperationKind;

/// Severity class of an SDK event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Info,
    Error,
    /// Transient failure; the request is kept and retried later.
    RetryError,
}

/// Well-known event codes with their default messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCode {
    Initialized,
    SubscribeSent,
    TokenUpdated,
    PushEventSent,
    MobileEventSent,
    MediaLoaded,
    SdkCleared,
    StaleTokenUpdate,
    DuplicatePushEvent,
    TokenUnchanged,
    ConfigInvalid,
    AuthUnavailable,
    ValidationFailed,
    NotInitialized,
    TokenUnavailable,
    RequestRejected,
    RetryLimitExceeded,
    ForegroundUnavailable,
    LocalStorageFailure,
    RequestRetry,
}

impl EventCode {
    /// Numeric code reported to the host application.
    pub fn code(self) -> u16 {
        match self {
            EventCode::Initialized => 200,
            EventCode::SubscribeSent => 230,
            EventCode::TokenUpdated => 231,
            EventCode::PushEventSent => 232,
            EventCode::MobileEventSent => 233,
            EventCode::MediaLoaded => 234,
            EventCode::SdkCleared => 240,
            EventCode::StaleTokenUpdate => 241,
            EventCode::DuplicatePushEvent => 242,
            EventCode::TokenUnchanged => 243,
            EventCode::ConfigInvalid => 400,
            EventCode::AuthUnavailable => 401,
            EventCode::ValidationFailed => 402,
            EventCode::NotInitialized => 403,
            EventCode::TokenUnavailable => 404,
            EventCode::RequestRejected => 410,
            EventCode::RetryLimitExceeded => 450,
            EventCode::ForegroundUnavailable => 460,
            EventCode::LocalStorageFailure => 470,
            EventCode::RequestRetry => 500,
        }
    }

    /// Default human-readable message.
    pub fn message(self) -> &'static str {
        match self {
            EventCode::Initialized => "sdk initialized",
            EventCode::SubscribeSent => "subscription request confirmed",
            EventCode::TokenUpdated => "device token confirmed",
            EventCode::PushEventSent => "push event confirmed",
            EventCode::MobileEventSent => "mobile event confirmed",
            EventCode::MediaLoaded => "notification media loaded",
            EventCode::SdkCleared => "sdk cleared",
            EventCode::StaleTokenUpdate => "superseded token update abandoned",
            EventCode::DuplicatePushEvent => "push event already reported",
            EventCode::TokenUnchanged => "device token unchanged",
            EventCode::ConfigInvalid => "invalid configuration",
            EventCode::AuthUnavailable => "cannot identify user: no rtoken or matching claim",
            EventCode::ValidationFailed => "request validation failed",
            EventCode::NotInitialized => "sdk is not initialized",
            EventCode::TokenUnavailable => "no push provider returned a token",
            EventCode::RequestRejected => "request rejected by server",
            EventCode::RetryLimitExceeded => "retry limit exceeded, request dropped",
            EventCode::ForegroundUnavailable => {
                "foreground window unavailable, running without it"
            }
            EventCode::LocalStorageFailure => "local storage error",
            EventCode::RequestRetry => "temporary failure, request will be retried",
        }
    }

    /// Info code reported when the server confirms a request of `kind`.
    pub fn confirmed(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Subscribe => EventCode::SubscribeSent,
            OperationKind::TokenUpdate => EventCode::TokenUpdated,
            OperationKind::PushEvent => EventCode::PushEventSent,
            OperationKind::MobileEvent => EventCode::MobileEventSent,
        }
    }

    /// Event kind implied by the code range.
    pub fn kind(self) -> EventKind {
        match self.code() {
            0..=399 => EventKind::Info,
            400..=499 => EventKind::Error,
            _ => EventKind::RetryError,
        }
    }
}

/// A diagnostic or result event delivered through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkEvent {
    pub id: Uuid,
    pub kind: EventKind,
    /// Name of the operation that produced the event.
    pub function: String,
    pub code: Option<u16>,
    pub message: String,
    pub value: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl SdkEvent {
    /// Creates an event with an explicit kind and message.
    pub fn new(
        kind: EventKind,
        function: impl Into<String>,
        code: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            function: function.into(),
            code,
            message: message.into(),
            value: None,
            created_at: Utc::now(),
        }
    }

    /// Creates an event from a well-known code, using its default message.
    pub fn from_code(function: impl Into<String>, code: EventCode) -> Self {
        Self::new(code.kind(), function, Some(code.code()), code.message())
    }

    /// Replaces the message, keeping kind and code.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attaches a JSON value (server response, row identifiers).
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Returns `true` if the event carries the given code.
    pub fn is(&self, code: EventCode) -> bool {
        self.code == Some(code.code())
    }
}

/// Classification of exactly one network attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// The server confirmed the request.
    Success(SdkEvent),
    /// Permanent failure; the request must not be retried.
    Failure(SdkEvent),
    /// Transient failure; the request may be retried.
    Retry(SdkEvent),
}

impl RequestOutcome {
    /// The event describing the outcome.
    pub fn event(&self) -> &SdkEvent {
        match self {
            RequestOutcome::Success(e) | RequestOutcome::Failure(e) | RequestOutcome::Retry(e) => e,
        }
    }

    pub fn into_event(self) -> SdkEvent {
        match self {
            RequestOutcome::Success(e) | RequestOutcome::Failure(e) | RequestOutcome::Retry(e) => e,
        }
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, RequestOutcome::Retry(_))
    }
}
