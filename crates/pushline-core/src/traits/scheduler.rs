// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deferred-task scheduler traits, modelled on an OS work-manager API.

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::OperationKind;
use crate::work::{ExistingWorkPolicy, WorkRequest, WorkResult};

/// Registers deferred work with unique-tag de-duplication, backoff and a
/// network-available constraint.
pub trait TaskScheduler: Send + Sync + 'static {
    /// Registers `request`, resolving a tag clash with `policy`.
    fn enqueue_unique(
        &self,
        request: WorkRequest,
        policy: ExistingWorkPolicy,
        handler: Arc<dyn TaskHandler>,
    );

    /// Cancels the work registered under `tag`, if any.
    fn cancel(&self, tag: &str);

    /// Cancels every registered work item.
    fn cancel_all(&self);

    /// Whether work is currently registered under `tag`.
    fn is_scheduled(&self, tag: &str) -> bool;
}

/// Work body invoked by a [`TaskScheduler`].
#[async_trait]
pub trait TaskHandler: Send + Sync + 'static {
    /// Runs one pass for `kind` and reports whether work remains.
    async fn run(&self, kind: OperationKind) -> WorkResult;
}
