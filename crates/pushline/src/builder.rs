// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembly of a [`Pushline`] instance from its collaborators.

use std::sync::Arc;

use pushline_bus::EventBus;
use pushline_config::PushlineSettings;
use pushline_core::{
    EventSink, ForegroundHost, JwtProvider, PushGateway, PushStore, PushlineError, TaskScheduler,
    TokenProvider,
};
use pushline_delivery::{
    Connectivity, DeliveryContext, ForegroundBridge, RetryScheduler, TokioTaskScheduler,
};
use pushline_net::ApiClient;
use pushline_storage::SqliteStore;
use tracing::debug;

use crate::sdk::Pushline;

/// Collects settings and platform collaborators.
///
/// Anything not supplied falls back to the bundled implementation: the
/// SQLite store at `storage.database_path`, the reqwest API client and the
/// tokio task scheduler. Without a foreground host, work that asks for a
/// foreground window simply runs directly.
#[derive(Default)]
pub struct PushlineBuilder {
    settings: PushlineSettings,
    store: Option<Arc<dyn PushStore>>,
    gateway: Option<Arc<dyn PushGateway>>,
    scheduler: Option<Arc<dyn TaskScheduler>>,
    connectivity: Option<Connectivity>,
    foreground: Option<Arc<dyn ForegroundHost>>,
    jwt: Option<Arc<dyn JwtProvider>>,
    token_providers: Vec<Arc<dyn TokenProvider>>,
    sink: Option<Arc<dyn EventSink>>,
}

impl PushlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(mut self, settings: PushlineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn store(mut self, store: Arc<dyn PushStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn PushGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn task_scheduler(mut self, scheduler: Arc<dyn TaskScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Connectivity source for the bundled tokio scheduler. Ignored when a
    /// task scheduler is supplied.
    pub fn connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    pub fn foreground_host(mut self, host: Arc<dyn ForegroundHost>) -> Self {
        self.foreground = Some(host);
        self
    }

    pub fn jwt_provider(mut self, jwt: Arc<dyn JwtProvider>) -> Self {
        self.jwt = Some(jwt);
        self
    }

    /// Adds a push vendor. Vendors are asked in the configured priority
    /// order, or in the order they were added.
    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_providers.push(provider);
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Opens the store if needed and wires everything together.
    pub async fn build(self) -> Result<Pushline, PushlineError> {
        let settings = self.settings;

        let store: Arc<dyn PushStore> = match self.store {
            Some(store) => store,
            None => Arc::new(SqliteStore::open(settings.storage.clone()).await?),
        };
        let gateway: Arc<dyn PushGateway> = match self.gateway {
            Some(gateway) => gateway,
            None => Arc::new(ApiClient::new(&settings.network)?),
        };
        let scheduler: Arc<dyn TaskScheduler> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(TokioTaskScheduler::with_connectivity(
                settings.retry.max_backoff(),
                self.connectivity.unwrap_or_default(),
            )),
        };

        let bus = Arc::new(EventBus::new());
        if let Some(sink) = self.sink {
            bus.subscribe(sink);
        }

        let foreground = ForegroundBridge::new(self.foreground, bus.clone(), &settings.foreground);
        let mut ctx = DeliveryContext::new(
            store,
            gateway,
            bus.clone(),
            foreground,
            settings.retry.clone(),
        );
        if let Some(jwt) = self.jwt {
            ctx = ctx.with_jwt_provider(jwt);
        }
        for provider in self.token_providers {
            ctx = ctx.with_token_provider(provider);
        }

        let retry = RetryScheduler::new(Arc::new(ctx), scheduler);
        debug!("pushline instance built");
        Ok(Pushline::from_parts(bus, retry))
    }
}
