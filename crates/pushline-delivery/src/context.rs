// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared collaborators of the delivery core, owned in one place.

use std::sync::Arc;

use pushline_bus::EventBus;
use pushline_config::model::RetrySettings;
use pushline_core::{
    next_retry_count, AuthContext, DeviceToken, EventCode, JwtProvider, OperationKind,
    PushConfiguration, PushGateway, PushStore, PushlineError, RequestOutcome, SdkEvent,
    TokenProvider,
};
use serde_json::json;
use tracing::debug;

use crate::foreground::ForegroundBridge;
use crate::queue::CommandQueue;

/// What happened to a pending row after one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Server confirmed; row deleted.
    Confirmed,
    /// Permanent failure; row deleted.
    Rejected,
    /// Transient failure; row kept with `retry_count` incremented.
    Kept,
    /// Transient failure past the retry limit; row deleted.
    Dropped,
}

/// Store, gateway, event bus, serializer and identity sources used by both
/// the immediate call path and scheduled retry passes.
pub struct DeliveryContext {
    store: Arc<dyn PushStore>,
    gateway: Arc<dyn PushGateway>,
    bus: Arc<EventBus>,
    queue: CommandQueue,
    foreground: ForegroundBridge,
    jwt: Option<Arc<dyn JwtProvider>>,
    token_providers: Vec<Arc<dyn TokenProvider>>,
    retry: RetrySettings,
}

impl DeliveryContext {
    pub fn new(
        store: Arc<dyn PushStore>,
        gateway: Arc<dyn PushGateway>,
        bus: Arc<EventBus>,
        foreground: ForegroundBridge,
        retry: RetrySettings,
    ) -> Self {
        Self {
            store,
            gateway,
            bus,
            queue: CommandQueue::new(),
            foreground,
            jwt: None,
            token_providers: Vec::new(),
            retry,
        }
    }

    pub fn with_jwt_provider(mut self, jwt: Arc<dyn JwtProvider>) -> Self {
        self.jwt = Some(jwt);
        self
    }

    /// Registers a push vendor. Vendors are asked in the configured
    /// priority order, or in registration order when none is configured.
    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_providers.push(provider);
        self
    }

    pub fn store(&self) -> &dyn PushStore {
        self.store.as_ref()
    }

    pub fn gateway(&self) -> &dyn PushGateway {
        self.gateway.as_ref()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn foreground(&self) -> &ForegroundBridge {
        &self.foreground
    }

    pub fn retry_settings(&self) -> &RetrySettings {
        &self.retry
    }

    /// Identity for requests made under `config`.
    pub fn resolve_auth(&self, config: &PushConfiguration) -> Option<AuthContext> {
        pushline_auth::resolve(config, self.jwt.as_deref())
    }

    /// First non-empty token handed out by a registered vendor.
    pub async fn current_token(&self, config: &PushConfiguration) -> Option<DeviceToken> {
        let ordered: Vec<&Arc<dyn TokenProvider>> = if config.provider_priority.is_empty() {
            self.token_providers.iter().collect()
        } else {
            config
                .provider_priority
                .iter()
                .filter_map(|wanted| {
                    self.token_providers
                        .iter()
                        .find(|p| p.provider() == *wanted)
                })
                .collect()
        };

        for provider in ordered {
            if let Some(token) = provider.token().await.filter(|t| !t.trim().is_empty()) {
                return Some(DeviceToken {
                    provider: provider.provider(),
                    token,
                });
            }
        }
        None
    }

    /// Applies the outcome of one attempt to the row it was made for.
    ///
    /// Success and permanent failure delete the row. A retry marker either
    /// increments `retry_count` or, once the limit is reached, deletes the
    /// row and emits a single `RetryLimitExceeded` event instead of the
    /// retry diagnostic.
    pub async fn settle(
        &self,
        kind: OperationKind,
        id: i64,
        retry_count: i64,
        max_retry_count: i64,
        outcome: RequestOutcome,
    ) -> Result<Settled, PushlineError> {
        match outcome {
            RequestOutcome::Success(event) => {
                self.store.delete_row(kind, id).await?;
                self.bus.emit(event);
                Ok(Settled::Confirmed)
            }
            RequestOutcome::Failure(event) => {
                self.store.delete_row(kind, id).await?;
                self.bus.emit(event);
                Ok(Settled::Rejected)
            }
            RequestOutcome::Retry(event) => match next_retry_count(retry_count, max_retry_count) {
                Some(next) => {
                    self.store.increase_retry_count(kind, id).await?;
                    debug!(%kind, id, retry_count = next, max_retry_count, "row kept for retry");
                    self.bus.emit(event);
                    Ok(Settled::Kept)
                }
                None => {
                    self.store.delete_row(kind, id).await?;
                    self.bus.emit(
                        SdkEvent::from_code(event.function.clone(), EventCode::RetryLimitExceeded)
                            .with_value(json!({
                                "kind": kind.to_string(),
                                "id": id,
                                "retry_count": retry_count,
                                "last_error": event.message,
                            })),
                    );
                    Ok(Settled::Dropped)
                }
            },
        }
    }
}

impl std::fmt::Debug for DeliveryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryContext")
            .field("has_jwt_provider", &self.jwt.is_some())
            .field("token_providers", &self.token_providers.len())
            .finish_non_exhaustive()
    }
}
