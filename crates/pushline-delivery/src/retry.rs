// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background retry scheduling per operation kind.
//!
//! Each kind moves through `Idle -> Scheduled -> Running` and back. The
//! scheduled work itself lives in a [`TaskScheduler`]; this module decides
//! what to register and runs the pass when the work fires.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use pushline_core::{
    EventCode, ExistingWorkPolicy, OperationKind, PushlineError, SdkEvent, TaskHandler,
    TaskScheduler, WorkRequest, WorkResult,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::context::DeliveryContext;
use crate::worker::{self, PassSummary};

/// Scheduling state of one operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindState {
    /// No pending rows and no work registered by this scheduler.
    #[default]
    Idle,
    /// Work registered with the task scheduler.
    Scheduled,
    /// A pass holds the kind's lock and is draining rows.
    Running,
}

/// Drives retry passes through a [`TaskScheduler`].
pub struct RetryScheduler {
    ctx: Arc<DeliveryContext>,
    scheduler: Arc<dyn TaskScheduler>,
    states: DashMap<OperationKind, KindState>,
}

impl RetryScheduler {
    pub fn new(ctx: Arc<DeliveryContext>, scheduler: Arc<dyn TaskScheduler>) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            scheduler,
            states: DashMap::new(),
        })
    }

    pub fn context(&self) -> &Arc<DeliveryContext> {
        &self.ctx
    }

    pub fn state(&self, kind: OperationKind) -> KindState {
        self.states.get(&kind).map(|s| *s).unwrap_or_default()
    }

    fn set_state(&self, kind: OperationKind, state: KindState) {
        self.states.insert(kind, state);
    }

    /// Registers a one-shot retry for `kind`. An already registered retry
    /// is kept, so repeated failures never stack up tasks.
    pub fn schedule_retry(self: &Arc<Self>, kind: OperationKind) {
        let request = WorkRequest::one_shot(kind, self.ctx.retry_settings().backoff());
        // A registration outside a running pass may belong to a task that
        // already finished its pass and is about to unregister.
        let running = self.state(kind) == KindState::Running;
        let policy = if running {
            ExistingWorkPolicy::Keep
        } else {
            ExistingWorkPolicy::Replace
        };
        self.scheduler.enqueue_unique(request, policy, self.clone());
        if !running {
            self.set_state(kind, KindState::Scheduled);
        }
        debug!(%kind, "retry scheduled");
    }

    /// Registers the periodic drain for every kind.
    pub fn schedule_periodic(self: &Arc<Self>) {
        let settings = self.ctx.retry_settings();
        for kind in OperationKind::ALL {
            let request =
                WorkRequest::periodic(kind, settings.periodic_interval(), settings.backoff());
            self.scheduler
                .enqueue_unique(request, ExistingWorkPolicy::Keep, self.clone());
            if self.state(kind) == KindState::Idle {
                self.set_state(kind, KindState::Scheduled);
            }
        }
        debug!(
            interval_secs = settings.periodic_interval_secs,
            "periodic retry work scheduled"
        );
    }

    /// Cancels every retry and periodic task this scheduler registered.
    pub fn cancel_all(&self) {
        for kind in OperationKind::ALL {
            self.scheduler.cancel(&kind.retry_tag());
            self.scheduler.cancel(&kind.periodic_tag());
            self.set_state(kind, KindState::Idle);
        }
    }

    /// Runs one pass for `kind` under the kind's lock.
    pub async fn run_pass(&self, kind: OperationKind) -> Result<PassSummary, PushlineError> {
        let _guard = self.ctx.queue().lock(kind).await;
        self.set_state(kind, KindState::Running);

        let result = worker::run_pass(&self.ctx, kind).await;

        let next = match &result {
            Ok(summary) if !summary.remaining && !self.is_registered(kind) => KindState::Idle,
            _ => KindState::Scheduled,
        };
        self.set_state(kind, next);
        result
    }

    /// Runs one pass for every kind, one after another.
    pub async fn run_all(&self) -> Result<Vec<(OperationKind, PassSummary)>, PushlineError> {
        let mut summaries = Vec::with_capacity(OperationKind::ALL.len());
        for kind in OperationKind::ALL {
            summaries.push((kind, self.run_pass(kind).await?));
        }
        Ok(summaries)
    }

    fn is_registered(&self, kind: OperationKind) -> bool {
        self.scheduler.is_scheduled(&kind.periodic_tag())
    }
}

impl std::fmt::Debug for RetryScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let states: Vec<(OperationKind, KindState)> = OperationKind::ALL
            .into_iter()
            .map(|kind| (kind, self.state(kind)))
            .collect();
        f.debug_struct("RetryScheduler")
            .field("states", &states)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TaskHandler for RetryScheduler {
    async fn run(&self, kind: OperationKind) -> WorkResult {
        match self.run_pass(kind).await {
            Ok(summary) if summary.remaining => WorkResult::Retry,
            Ok(_) => WorkResult::Success,
            Err(e) => {
                warn!(%kind, error = %e, "retry pass failed");
                self.ctx.bus().emit(
                    SdkEvent::from_code("retry_pass", EventCode::LocalStorageFailure)
                        .with_message(e.to_string())
                        .with_value(json!({ "kind": kind.to_string() })),
                );
                WorkResult::Retry
            }
        }
    }
}
