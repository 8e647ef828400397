// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task scheduler the test drives by hand.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use pushline_core::{ExistingWorkPolicy, TaskHandler, TaskScheduler, WorkRequest, WorkResult};

struct Entry {
    request: WorkRequest,
    handler: Arc<dyn TaskHandler>,
}

/// Registers work like an OS scheduler but never runs it on its own.
///
/// [`ManualScheduler::run`] executes one registered task, mimicking the OS
/// firing it. One-shot work that reports success is unregistered.
#[derive(Default)]
pub struct ManualScheduler {
    entries: Mutex<BTreeMap<String, Entry>>,
    enqueued: Mutex<Vec<(WorkRequest, ExistingWorkPolicy)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `enqueue_unique` call, including ones dropped by `Keep`.
    pub fn enqueued(&self) -> Vec<(WorkRequest, ExistingWorkPolicy)> {
        self.enqueued.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Tags currently registered, sorted.
    pub fn tags(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    /// Fire the work registered under `tag`. Returns `None` if nothing is
    /// registered.
    pub async fn run(&self, tag: &str) -> Option<WorkResult> {
        let (request, handler) = {
            let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
            let entry = entries.get(tag)?;
            (entry.request.clone(), entry.handler.clone())
        };
        let result = handler.run(request.kind).await;
        if result == WorkResult::Success && request.periodic.is_none() {
            self.entries
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .remove(tag);
        }
        Some(result)
    }
}

impl TaskScheduler for ManualScheduler {
    fn enqueue_unique(
        &self,
        request: WorkRequest,
        policy: ExistingWorkPolicy,
        handler: Arc<dyn TaskHandler>,
    ) {
        self.enqueued
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((request.clone(), policy));
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        if policy == ExistingWorkPolicy::Keep && entries.contains_key(&request.tag) {
            return;
        }
        entries.insert(request.tag.clone(), Entry { request, handler });
    }

    fn cancel(&self, tag: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(tag);
    }

    fn cancel_all(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clear();
    }

    fn is_scheduled(&self, tag: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(tag)
    }
}
