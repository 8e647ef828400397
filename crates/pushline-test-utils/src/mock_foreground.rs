// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Foreground host mock.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pushline_core::{ForegroundHost, PushlineError};

/// Records window starts and stops. Can be told to refuse windows.
#[derive(Debug, Default)]
pub struct MockForegroundHost {
    refuse: AtomicBool,
    started: Mutex<Vec<(String, String)>>,
    stopped: Mutex<Vec<String>>,
    active: Mutex<HashSet<String>>,
}

impl MockForegroundHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that rejects every `start` call.
    pub fn refusing() -> Self {
        let host = Self::default();
        host.refuse.store(true, Ordering::SeqCst);
        host
    }

    /// `(operation_id, message)` of every granted window.
    pub fn started(&self) -> Vec<(String, String)> {
        self.started.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Operation ids of every `stop` call, in order.
    pub fn stopped(&self) -> Vec<String> {
        self.stopped.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Windows started and not yet stopped.
    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[async_trait]
impl ForegroundHost for MockForegroundHost {
    async fn start(&self, operation_id: &str, message: &str) -> Result<(), PushlineError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(PushlineError::Internal(
                "foreground service start not allowed".into(),
            ));
        }
        self.started
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((operation_id.to_string(), message.to_string()));
        self.active
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(operation_id.to_string());
        Ok(())
    }

    fn stop(&self, operation_id: &str) {
        self.stopped
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(operation_id.to_string());
        self.active
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(operation_id);
    }
}
