// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event bus for SDK result and diagnostic events.
//!
//! The bus holds at most one [`EventSink`], injected by the host
//! application, and logs every event locally whether or not a sink is
//! subscribed. There is no global subscriber: each SDK instance owns its bus.

use std::sync::{Arc, RwLock};

use pushline_core::{EventCode, EventKind, EventSink, SdkEvent};
use tracing::{error, info, warn};

/// Single-subscriber fan-out of [`SdkEvent`]s.
#[derive(Default)]
pub struct EventBus {
    sink: RwLock<Option<Arc<dyn EventSink>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `sink`, replacing any previous subscriber.
    pub fn subscribe(&self, sink: Arc<dyn EventSink>) {
        let mut slot = self.sink.write().unwrap_or_else(|p| p.into_inner());
        *slot = Some(sink);
    }

    /// Removes the current subscriber.
    pub fn unsubscribe(&self) {
        let mut slot = self.sink.write().unwrap_or_else(|p| p.into_inner());
        *slot = None;
    }

    pub fn has_subscriber(&self) -> bool {
        self.sink
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }

    /// Logs `event` and forwards it to the subscriber, if any.
    pub fn emit(&self, event: SdkEvent) {
        log_event(&event);
        // Clone the Arc so the sink runs without the lock held.
        let sink = self
            .sink
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(sink) = sink {
            sink.on_event(&event);
        }
    }

    /// Emits the well-known event `code` for `function`.
    pub fn emit_code(&self, function: &str, code: EventCode) {
        self.emit(SdkEvent::from_code(function, code));
    }

    /// Emits `code` with a custom message.
    pub fn emit_message(&self, function: &str, code: EventCode, message: impl Into<String>) {
        self.emit(SdkEvent::from_code(function, code).with_message(message));
    }

    /// Emits `code` carrying a JSON value.
    pub fn emit_value(&self, function: &str, code: EventCode, value: serde_json::Value) {
        self.emit(SdkEvent::from_code(function, code).with_value(value));
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("has_subscriber", &self.has_subscriber())
            .finish()
    }
}

fn log_event(event: &SdkEvent) {
    let code = event.code.unwrap_or_default();
    match event.kind {
        EventKind::Info => info!(function = %event.function, code, "{}", event.message),
        EventKind::Error => error!(function = %event.function, code, "{}", event.message),
        EventKind::RetryError => warn!(function = %event.function, code, "{}", event.message),
    }
}
