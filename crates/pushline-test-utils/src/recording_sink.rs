// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event sink that records everything it receives.

use std::sync::Mutex;

use pushline_core::{EventCode, EventSink, SdkEvent};

#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SdkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event received so far.
    pub fn events(&self) -> Vec<SdkEvent> {
        self.lock().clone()
    }

    /// Numeric codes of the received events, in order.
    pub fn codes(&self) -> Vec<u16> {
        self.lock().iter().filter_map(|e| e.code).collect()
    }

    /// How many received events carry `code`.
    pub fn count(&self, code: EventCode) -> usize {
        self.lock().iter().filter(|e| e.is(code)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SdkEvent>> {
        self.events.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl EventSink for RecordingSink {
    fn on_event(&self, event: &SdkEvent) {
        self.lock().push(event.clone());
    }
}
