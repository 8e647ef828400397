// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tokio-backed deferred-task scheduler.
//!
//! Stands in for the OS work scheduler off-device: unique work per tag,
//! an initial delay, a connectivity constraint, exponential backoff while
//! the handler asks for a retry, and periodic re-runs. Each registration
//! is a tokio task driven by its own [`CancellationToken`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use pushline_core::{ExistingWorkPolicy, TaskHandler, TaskScheduler, WorkRequest, WorkResult};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::backoff::BackoffPolicy;

/// Network availability as seen by the scheduler.
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    /// Reports a connectivity change. Work waiting for the network resumes
    /// when this flips to `true`.
    pub fn set_online(&self, online: bool) {
        let previous = self.tx.send_replace(online);
        if previous != online {
            info!(online, "connectivity changed");
        }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

struct Registered {
    id: u64,
    cancel: CancellationToken,
}

/// [`TaskScheduler`] running work on the current tokio runtime.
pub struct TokioTaskScheduler {
    tasks: Arc<DashMap<String, Registered>>,
    connectivity: Connectivity,
    max_backoff: Duration,
    next_id: AtomicU64,
}

impl TokioTaskScheduler {
    pub fn new(max_backoff: Duration) -> Self {
        Self::with_connectivity(max_backoff, Connectivity::default())
    }

    pub fn with_connectivity(max_backoff: Duration, connectivity: Connectivity) -> Self {
        Self {
            tasks: Arc::new(DashMap::new()),
            connectivity,
            max_backoff,
            next_id: AtomicU64::new(0),
        }
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Number of registered work items.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl std::fmt::Debug for TokioTaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioTaskScheduler")
            .field("registered", &self.tasks.len())
            .field("max_backoff", &self.max_backoff)
            .finish()
    }
}

impl TaskScheduler for TokioTaskScheduler {
    fn enqueue_unique(
        &self,
        request: WorkRequest,
        policy: ExistingWorkPolicy,
        handler: Arc<dyn TaskHandler>,
    ) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let registered = Registered {
            id,
            cancel: cancel.clone(),
        };

        match self.tasks.entry(request.tag.clone()) {
            Entry::Occupied(mut existing) => match policy {
                ExistingWorkPolicy::Keep => {
                    debug!(tag = %request.tag, "work already registered, keeping it");
                    return;
                }
                ExistingWorkPolicy::Replace => {
                    existing.get().cancel.cancel();
                    existing.insert(registered);
                    debug!(tag = %request.tag, "work replaced");
                }
            },
            Entry::Vacant(slot) => {
                slot.insert(registered);
            }
        }

        debug!(
            tag = %request.tag,
            kind = %request.kind,
            delay_secs = request.initial_delay.as_secs(),
            periodic = request.periodic.is_some(),
            "work registered"
        );
        tokio::spawn(drive(
            self.tasks.clone(),
            id,
            request,
            handler,
            cancel,
            self.connectivity.subscribe(),
            self.max_backoff,
        ));
    }

    fn cancel(&self, tag: &str) {
        if let Some((_, registered)) = self.tasks.remove(tag) {
            registered.cancel.cancel();
            debug!(tag, "work cancelled");
        }
    }

    fn cancel_all(&self) {
        let tags: Vec<String> = self.tasks.iter().map(|e| e.key().clone()).collect();
        for tag in tags {
            self.cancel(&tag);
        }
    }

    fn is_scheduled(&self, tag: &str) -> bool {
        self.tasks.contains_key(tag)
    }
}

async fn drive(
    tasks: Arc<DashMap<String, Registered>>,
    id: u64,
    request: WorkRequest,
    handler: Arc<dyn TaskHandler>,
    cancel: CancellationToken,
    mut online: watch::Receiver<bool>,
    max_backoff: Duration,
) {
    let backoff = BackoffPolicy::new(request.backoff, max_backoff);
    let mut delay = request.initial_delay;
    let mut failures: u32 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        if request.requires_network {
            tokio::select! {
                _ = cancel.cancelled() => break,
                // A closed channel cannot report connectivity; run anyway.
                _ = online.wait_for(|up| *up) => {}
            }
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = handler.run(request.kind) => result,
        };

        match (result, request.periodic) {
            (WorkResult::Retry, _) => {
                delay = backoff.delay_for_attempt(failures);
                failures = failures.saturating_add(1);
                debug!(tag = %request.tag, delay_secs = delay.as_secs(), "work asked for retry");
            }
            (WorkResult::Success, Some(interval)) => {
                failures = 0;
                delay = interval;
            }
            (WorkResult::Success, None) => break,
        }
    }

    tasks.remove_if(&request.tag, |_, registered| registered.id == id);
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pushline_core::OperationKind;
    use tokio::time::Instant;

    use super::*;

    /// Returns scripted results, then `Success`, recording when it ran.
    struct Scripted {
        results: Mutex<Vec<WorkResult>>,
        runs: Mutex<Vec<Instant>>,
    }

    impl Scripted {
        fn new(mut results: Vec<WorkResult>) -> Arc<Self> {
            results.reverse();
            Arc::new(Self {
                results: Mutex::new(results),
                runs: Mutex::new(Vec::new()),
            })
        }

        fn runs(&self) -> Vec<Instant> {
            self.runs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TaskHandler for Scripted {
        async fn run(&self, _kind: OperationKind) -> WorkResult {
            self.runs.lock().unwrap().push(Instant::now());
            self.results.lock().unwrap().pop().unwrap_or(WorkResult::Success)
        }
    }

    fn one_shot() -> WorkRequest {
        WorkRequest::one_shot(OperationKind::Subscribe, Duration::from_secs(30))
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_runs_after_delay_and_unregisters() {
        let scheduler = TokioTaskScheduler::new(Duration::from_secs(3600));
        let handler = Scripted::new(vec![]);
        let start = Instant::now();

        scheduler.enqueue_unique(one_shot(), ExistingWorkPolicy::Keep, handler.clone());
        assert!(scheduler.is_scheduled(&one_shot().tag));

        tokio::time::sleep(Duration::from_secs(31)).await;
        let runs = handler.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0] - start, Duration::from_secs(30));
        assert!(!scheduler.is_scheduled(&one_shot().tag));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_result_backs_off_exponentially() {
        let scheduler = TokioTaskScheduler::new(Duration::from_secs(3600));
        let handler = Scripted::new(vec![WorkResult::Retry, WorkResult::Retry]);

        scheduler.enqueue_unique(one_shot(), ExistingWorkPolicy::Keep, handler.clone());
        tokio::time::sleep(Duration::from_secs(30 + 30 + 60 + 1)).await;

        let runs = handler.runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1] - runs[0], Duration::from_secs(30));
        assert_eq!(runs[2] - runs[1], Duration::from_secs(60));
        assert!(scheduler.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn keep_ignores_and_replace_supersedes() {
        let scheduler = TokioTaskScheduler::new(Duration::from_secs(3600));
        let first = Scripted::new(vec![]);
        let second = Scripted::new(vec![]);

        scheduler.enqueue_unique(one_shot(), ExistingWorkPolicy::Keep, first.clone());
        scheduler.enqueue_unique(one_shot(), ExistingWorkPolicy::Keep, second.clone());
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(first.runs().len(), 1);
        assert!(second.runs().is_empty());

        let third = Scripted::new(vec![]);
        scheduler.enqueue_unique(one_shot(), ExistingWorkPolicy::Keep, first.clone());
        scheduler.enqueue_unique(one_shot(), ExistingWorkPolicy::Replace, third.clone());
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(first.runs().len(), 1);
        assert_eq!(third.runs().len(), 1);
        assert_eq!(scheduler.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_work_never_runs() {
        let scheduler = TokioTaskScheduler::new(Duration::from_secs(3600));
        let handler = Scripted::new(vec![]);

        scheduler.enqueue_unique(one_shot(), ExistingWorkPolicy::Keep, handler.clone());
        let periodic = WorkRequest::periodic(
            OperationKind::PushEvent,
            Duration::from_secs(900),
            Duration::from_secs(30),
        );
        scheduler.enqueue_unique(periodic, ExistingWorkPolicy::Keep, handler.clone());
        assert_eq!(scheduler.len(), 2);

        scheduler.cancel_all();
        assert!(scheduler.is_empty());
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(handler.runs().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn network_constraint_waits_for_connectivity() {
        let connectivity = Connectivity::new(false);
        let scheduler =
            TokioTaskScheduler::with_connectivity(Duration::from_secs(3600), connectivity.clone());
        let handler = Scripted::new(vec![]);

        scheduler.enqueue_unique(one_shot(), ExistingWorkPolicy::Keep, handler.clone());
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(handler.runs().is_empty());
        assert!(scheduler.is_scheduled(&one_shot().tag));

        connectivity.set_online(true);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(handler.runs().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_work_reruns_on_interval() {
        let scheduler = TokioTaskScheduler::new(Duration::from_secs(3600));
        let handler = Scripted::new(vec![]);
        let periodic = WorkRequest::periodic(
            OperationKind::MobileEvent,
            Duration::from_secs(900),
            Duration::from_secs(30),
        );
        let tag = periodic.tag.clone();

        scheduler.enqueue_unique(periodic, ExistingWorkPolicy::Keep, handler.clone());
        tokio::time::sleep(Duration::from_secs(900 * 3 + 1)).await;

        assert_eq!(handler.runs().len(), 3);
        assert!(scheduler.is_scheduled(&tag));
        scheduler.cancel(&tag);
        assert!(!scheduler.is_scheduled(&tag));
    }
}
