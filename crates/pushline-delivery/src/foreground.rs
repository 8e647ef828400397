// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Foreground execution bridge.
//!
//! Wraps work that must not be killed when the host app goes to the
//! background in an elevated execution window. The window is always
//! released: by the guard when the work ends (normally or by cancellation)
//! or by a watchdog once the ceiling elapses, whichever comes first.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pushline_bus::EventBus;
use pushline_config::model::ForegroundSettings;
use pushline_core::{EventCode, ForegroundHost, PushConfiguration, SdkEvent};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct ForegroundBridge {
    host: Option<Arc<dyn ForegroundHost>>,
    bus: Arc<EventBus>,
    ceiling: Duration,
    default_message: String,
}

impl ForegroundBridge {
    pub fn new(
        host: Option<Arc<dyn ForegroundHost>>,
        bus: Arc<EventBus>,
        settings: &ForegroundSettings,
    ) -> Self {
        Self {
            host,
            bus,
            ceiling: settings.window_timeout(),
            default_message: settings.default_message.clone(),
        }
    }

    /// Runs `work` inside a foreground window and returns its result.
    ///
    /// Without a host, or when `config` disables the bridge, `work` runs
    /// directly. If the host refuses the window, `work` still runs and a
    /// `ForegroundUnavailable` event records the degradation.
    pub async fn run<F, T>(&self, config: &PushConfiguration, operation_id: &str, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let host = match &self.host {
            Some(host) if config.use_foreground_bridge => host.clone(),
            _ => return work.await,
        };

        let message = config
            .foreground_message
            .as_deref()
            .unwrap_or(&self.default_message);
        if let Err(e) = host.start(operation_id, message).await {
            warn!(operation_id, error = %e, "foreground window refused, running without it");
            self.bus.emit(
                SdkEvent::from_code(operation_id, EventCode::ForegroundUnavailable)
                    .with_value(serde_json::json!({ "reason": e.to_string() })),
            );
            return work.await;
        }
        debug!(operation_id, "foreground window acquired");

        let _window = WindowGuard::new(host, operation_id.to_string(), self.ceiling);
        work.await
    }
}

impl std::fmt::Debug for ForegroundBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForegroundBridge")
            .field("has_host", &self.host.is_some())
            .field("ceiling", &self.ceiling)
            .finish()
    }
}

/// Releases the window exactly once, on drop or when the watchdog fires.
struct WindowGuard {
    host: Arc<dyn ForegroundHost>,
    operation_id: String,
    released: Arc<AtomicBool>,
    watchdog: JoinHandle<()>,
}

impl WindowGuard {
    fn new(host: Arc<dyn ForegroundHost>, operation_id: String, ceiling: Duration) -> Self {
        let released = Arc::new(AtomicBool::new(false));
        let watchdog = {
            let host = host.clone();
            let operation_id = operation_id.clone();
            let released = released.clone();
            tokio::spawn(async move {
                tokio::time::sleep(ceiling).await;
                if !released.swap(true, Ordering::SeqCst) {
                    warn!(
                        operation_id = %operation_id,
                        ceiling_secs = ceiling.as_secs(),
                        "foreground window ceiling reached, releasing"
                    );
                    host.stop(&operation_id);
                }
            })
        };
        Self {
            host,
            operation_id,
            released,
            watchdog,
        }
    }
}

impl Drop for WindowGuard {
    fn drop(&mut self) {
        self.watchdog.abort();
        if !self.released.swap(true, Ordering::SeqCst) {
            self.host.stop(&self.operation_id);
            debug!(operation_id = %self.operation_id, "foreground window released");
        }
    }
}

#[cfg(test)]
mod tests {
    use pushline_core::PushlineError;
    use pushline_test_utils::{MockForegroundHost, RecordingSink};

    use super::*;

    fn bridge(host: Arc<MockForegroundHost>) -> (ForegroundBridge, Arc<RecordingSink>) {
        let bus = Arc::new(EventBus::new());
        let sink = Arc::new(RecordingSink::new());
        bus.subscribe(sink.clone());
        let bridge = ForegroundBridge::new(Some(host), bus, &ForegroundSettings::default());
        (bridge, sink)
    }

    fn enabled() -> PushConfiguration {
        let mut config = PushConfiguration::new("https://api.example.com");
        config.use_foreground_bridge = true;
        config
    }

    #[tokio::test]
    async fn window_wraps_work_and_is_released() {
        let host = Arc::new(MockForegroundHost::new());
        let (bridge, sink) = bridge(host.clone());

        let value = bridge
            .run(&enabled(), "push-1", async {
                assert_eq!(host.active_count(), 1);
                42
            })
            .await;

        assert_eq!(value, 42);
        assert_eq!(host.started()[0].1, "Sending notification data");
        assert_eq!(host.stopped(), vec!["push-1".to_string()]);
        assert_eq!(host.active_count(), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn configured_message_is_shown() {
        let host = Arc::new(MockForegroundHost::new());
        let (bridge, _) = bridge(host.clone());
        let mut config = enabled();
        config.foreground_message = Some("Syncing".into());

        bridge.run(&config, "op", async {}).await;
        assert_eq!(host.started()[0].1, "Syncing");
    }

    #[tokio::test]
    async fn disabled_bridge_runs_work_directly() {
        let host = Arc::new(MockForegroundHost::new());
        let (bridge, _) = bridge(host.clone());
        let config = PushConfiguration::new("https://api.example.com");

        assert_eq!(bridge.run(&config, "op", async { 1 }).await, 1);
        assert!(host.started().is_empty());
    }

    #[tokio::test]
    async fn refused_window_degrades_with_event() {
        let host = Arc::new(MockForegroundHost::refusing());
        let (bridge, sink) = bridge(host.clone());

        let result: Result<u8, PushlineError> =
            bridge.run(&enabled(), "op", async { Ok(5) }).await;

        assert_eq!(result.unwrap(), 5);
        assert_eq!(sink.count(EventCode::ForegroundUnavailable), 1);
        assert!(host.stopped().is_empty());
    }

    #[tokio::test]
    async fn cancelled_work_releases_window() {
        let host = Arc::new(MockForegroundHost::new());
        let (bridge, _) = bridge(host.clone());

        let timed_out = tokio::time::timeout(
            Duration::from_millis(10),
            bridge.run(&enabled(), "op", std::future::pending::<()>()),
        )
        .await;

        assert!(timed_out.is_err());
        assert_eq!(host.stopped(), vec!["op".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_releases_hung_work_once() {
        let host = Arc::new(MockForegroundHost::new());
        let (bridge, _) = bridge(host.clone());
        let bridge = Arc::new(bridge);

        let task = {
            let bridge = bridge.clone();
            tokio::spawn(async move {
                bridge
                    .run(&enabled(), "hung", tokio::time::sleep(Duration::from_secs(600)))
                    .await
            })
        };

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(host.stopped(), vec!["hung".to_string()]);
        assert_eq!(host.active_count(), 0);

        task.await.unwrap();
        // The guard must not stop the window a second time.
        assert_eq!(host.stopped().len(), 1);
    }
}
