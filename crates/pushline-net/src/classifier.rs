// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outcome classification.
//!
//! The classification, not the raw HTTP status, is what the delivery core
//! acts on. [`ApiClient`](crate::ApiClient) accepts a per-kind override.

use pushline_core::{EventCode, OperationKind, RequestOutcome, SdkEvent};
use serde_json::Value;

/// Longest slice of a response body quoted in an event message.
const BODY_EXCERPT_CHARS: usize = 200;

/// The parts of an HTTP response a classifier looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The body parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    fn excerpt(&self) -> String {
        let body = self.body.trim();
        match body.char_indices().nth(BODY_EXCERPT_CHARS) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        }
    }
}

/// Maps one HTTP attempt to exactly one outcome.
pub trait ResponseClassifier: Send + Sync + 'static {
    /// Classify a response that arrived.
    fn classify(&self, kind: OperationKind, function: &str, reply: &HttpReply) -> RequestOutcome;

    /// Classify an attempt that produced no response.
    ///
    /// Requests that could not even be built are permanent failures; every
    /// other transport error (connect, timeout, reset) is transient.
    fn classify_transport(&self, function: &str, error: &reqwest::Error) -> RequestOutcome {
        if error.is_builder() {
            RequestOutcome::Failure(
                SdkEvent::from_code(function, EventCode::ValidationFailed)
                    .with_message(format!("malformed request: {error}")),
            )
        } else {
            RequestOutcome::Retry(
                SdkEvent::from_code(function, EventCode::RequestRetry)
                    .with_message(format!("transport error: {error}")),
            )
        }
    }
}

/// Status-code based classification used unless a kind overrides it.
///
/// * 2xx with `error` absent, null or zero: success.
/// * 2xx with any other `error`: permanent failure.
/// * 408 and 429: retry.
/// * any other 4xx: permanent failure.
/// * 5xx: retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl DefaultClassifier {
    fn server_error(json: &Value) -> Option<String> {
        let error = json.get("error")?;
        let rejected = match error {
            Value::Null => false,
            Value::Number(n) => n.as_f64() != Some(0.0),
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty() && s != "0",
            _ => true,
        };
        if !rejected {
            return None;
        }
        let text = json
            .get("message")
            .or_else(|| json.get("error_text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("server reported error {error}"));
        Some(text)
    }
}

impl ResponseClassifier for DefaultClassifier {
    fn classify(&self, kind: OperationKind, function: &str, reply: &HttpReply) -> RequestOutcome {
        let json = reply.json();
        let attach = |event: SdkEvent| match &json {
            Some(value) => event.with_value(value.clone()),
            None => event,
        };

        match reply.status {
            200..=299 => match json.as_ref().and_then(Self::server_error) {
                None => RequestOutcome::Success(attach(SdkEvent::from_code(
                    function,
                    EventCode::confirmed(kind),
                ))),
                Some(text) => RequestOutcome::Failure(attach(
                    SdkEvent::from_code(function, EventCode::RequestRejected).with_message(text),
                )),
            },
            408 | 429 | 500..=599 => RequestOutcome::Retry(attach(
                SdkEvent::from_code(function, EventCode::RequestRetry)
                    .with_message(format!("HTTP {}: {}", reply.status, reply.excerpt())),
            )),
            _ => RequestOutcome::Failure(attach(
                SdkEvent::from_code(function, EventCode::RequestRejected)
                    .with_message(format!("HTTP {}: {}", reply.status, reply.excerpt())),
            )),
        }
    }
}
