// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deferred-work descriptions handed to a [`TaskScheduler`](crate::TaskScheduler).

use std::time::Duration;

use crate::types::OperationKind;

/// A unit of deferred work, keyed by a unique tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRequest {
    /// Unique-work tag. At most one request per tag is registered.
    pub tag: String,
    pub kind: OperationKind,
    pub initial_delay: Duration,
    /// Re-run interval for periodic work; `None` for one-shot work.
    pub periodic: Option<Duration>,
    /// Minimum delay before re-running after [`WorkResult::Retry`].
    pub backoff: Duration,
    /// Wait for connectivity before running.
    pub requires_network: bool,
}

impl WorkRequest {
    /// One-shot retry work for a kind.
    pub fn one_shot(kind: OperationKind, backoff: Duration) -> Self {
        Self {
            tag: kind.retry_tag(),
            kind,
            initial_delay: backoff,
            periodic: None,
            backoff,
            requires_network: true,
        }
    }

    /// Periodic retry work for a kind.
    pub fn periodic(kind: OperationKind, interval: Duration, backoff: Duration) -> Self {
        Self {
            tag: kind.periodic_tag(),
            kind,
            initial_delay: interval,
            periodic: Some(interval),
            backoff,
            requires_network: true,
        }
    }
}

/// What to do when work with the same tag is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingWorkPolicy {
    /// Leave the existing work in place and drop the new request.
    Keep,
    /// Cancel the existing work and register the new request.
    Replace,
}

/// Result a task handler reports back to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkResult {
    /// Nothing left to do.
    Success,
    /// Rows remain; run again after backoff.
    Retry,
}
