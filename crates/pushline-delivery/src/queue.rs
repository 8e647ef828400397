// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-kind submission serializer.
//!
//! One `tokio::sync::Mutex` per [`OperationKind`]. The tokio mutex is fair,
//! so same-kind submissions run in the order they started waiting.
//! Different kinds never block each other.

use std::future::Future;

use pushline_core::OperationKind;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct CommandQueue {
    locks: [Mutex<()>; 4],
}

/// Every kind lock, held together.
#[derive(Debug)]
pub struct AllKindsGuard<'a> {
    _guards: Vec<MutexGuard<'a, ()>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` while holding the lock of `kind`.
    ///
    /// The lock is released when `work` finishes or when the returned future
    /// is dropped mid-way.
    pub async fn submit<F, T>(&self, kind: OperationKind, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.lock(kind).await;
        work.await
    }

    /// Acquires the lock of `kind`.
    pub async fn lock(&self, kind: OperationKind) -> MutexGuard<'_, ()> {
        self.locks[kind.index()].lock().await
    }

    /// Acquires every kind lock in [`OperationKind::ALL`] order.
    pub async fn lock_all(&self) -> AllKindsGuard<'_> {
        let mut guards = Vec::with_capacity(OperationKind::ALL.len());
        for kind in OperationKind::ALL {
            guards.push(self.lock(kind).await);
        }
        AllKindsGuard { _guards: guards }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_kind_never_overlaps() {
        let queue = Arc::new(CommandQueue::new());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let queue = queue.clone();
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                tokio::spawn(async move {
                    queue
                        .submit(OperationKind::PushEvent, async {
                            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(2)).await;
                            in_flight.fetch_sub(1, Ordering::SeqCst);
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn same_kind_runs_in_submission_order() {
        let queue = Arc::new(CommandQueue::new());
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let holder = queue.lock(OperationKind::Subscribe).await;
        let mut tasks = Vec::new();
        for i in 0..5 {
            let queue = queue.clone();
            let order = order.clone();
            tasks.push(tokio::spawn(async move {
                queue
                    .submit(OperationKind::Subscribe, async {
                        order.lock().unwrap().push(i);
                    })
                    .await
            }));
            // Let task `i` reach the mutex before spawning the next one.
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        drop(holder);
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn different_kinds_run_concurrently() {
        let queue = CommandQueue::new();
        let _subscribe = queue.lock(OperationKind::Subscribe).await;
        let ran = tokio::time::timeout(
            Duration::from_secs(1),
            queue.submit(OperationKind::MobileEvent, async { 7 }),
        )
        .await;
        assert_eq!(ran.unwrap(), 7);
    }

    #[tokio::test]
    async fn cancelled_submission_releases_lock() {
        let queue = CommandQueue::new();
        let cancelled = tokio::time::timeout(
            Duration::from_millis(10),
            queue.submit(OperationKind::TokenUpdate, std::future::pending::<()>()),
        )
        .await;
        assert!(cancelled.is_err());

        let next = tokio::time::timeout(
            Duration::from_secs(1),
            queue.submit(OperationKind::TokenUpdate, async { "ok" }),
        )
        .await;
        assert_eq!(next.unwrap(), "ok");
    }

    #[tokio::test]
    async fn lock_all_blocks_every_kind() {
        let queue = CommandQueue::new();
        let all = queue.lock_all().await;
        for kind in OperationKind::ALL {
            let blocked = tokio::time::timeout(Duration::from_millis(5), queue.lock(kind)).await;
            assert!(blocked.is_err(), "{kind} should be locked");
        }
        drop(all);
        let _ = queue.lock(OperationKind::PushEvent).await;
    }
}
