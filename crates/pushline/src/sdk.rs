// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The public SDK object.
//!
//! Every operation runs under the command-queue lock of its kind: validate
//! and resolve the identity (nothing is persisted when that fails), persist
//! the row, make one attempt, then settle the row. A retry marker leaves
//! the row in place and registers a one-shot retry task for the kind.
//!
//! Results are reported through the event bus. `Err` is returned only for
//! local storage failures.

use std::sync::Arc;

use pushline_bus::EventBus;
use pushline_core::{
    now_timestamp, DeviceToken, EventCode, EventSink, MobileEventRow, OperationKind,
    PushConfiguration, PushEventRow, PushEventType, PushlineError, SubscribeRow,
    SubscriptionStatus, TokenUpdateRow,
};
use pushline_delivery::{
    attempt_mobile_event, attempt_push_event, attempt_subscribe, run_pass, DeliveryContext,
    KindState, PassSummary, RetryScheduler, Settled,
};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::builder::PushlineBuilder;
use crate::requests::{local_time_zone, MobileEventRequest, SubscribeOptions};

/// Entry point of the delivery core. Owns one delivery context; there is
/// no process-wide state, so several instances can coexist.
pub struct Pushline {
    bus: Arc<EventBus>,
    retry: Arc<RetryScheduler>,
}

impl Pushline {
    pub fn builder() -> PushlineBuilder {
        PushlineBuilder::new()
    }

    pub(crate) fn from_parts(bus: Arc<EventBus>, retry: Arc<RetryScheduler>) -> Self {
        Self { bus, retry }
    }

    fn ctx(&self) -> &DeliveryContext {
        self.retry.context()
    }

    /// Installs the single event subscriber, replacing any previous one.
    pub fn subscribe_events(&self, sink: Arc<dyn EventSink>) {
        self.bus.subscribe(sink);
    }

    pub fn unsubscribe_events(&self) {
        self.bus.unsubscribe();
    }

    /// Validates and persists `config`, overwriting any previous one, and
    /// registers the periodic retry work for every kind.
    pub async fn initialize(&self, config: PushConfiguration) -> Result<(), PushlineError> {
        const FUNCTION: &str = "initialize";
        if let Err(e) = config.validate() {
            self.bus
                .emit_message(FUNCTION, EventCode::ConfigInvalid, e.to_string());
            return Ok(());
        }

        self.ctx().store().set_config(&config).await?;
        self.retry.schedule_periodic();
        info!(api_url = %config.api_url, "sdk initialized");
        self.bus.emit_code(FUNCTION, EventCode::Initialized);
        Ok(())
    }

    /// The stored configuration, if `initialize` has run.
    pub async fn configuration(&self) -> Result<Option<PushConfiguration>, PushlineError> {
        self.ctx().store().get_config().await
    }

    pub async fn push_subscribe(&self, options: SubscribeOptions) -> Result<(), PushlineError> {
        self.subscription("push_subscribe", SubscriptionStatus::Subscribed, options)
            .await
    }

    pub async fn push_suspend(&self, options: SubscribeOptions) -> Result<(), PushlineError> {
        self.subscription("push_suspend", SubscriptionStatus::Suspended, options)
            .await
    }

    pub async fn push_unsubscribe(&self, options: SubscribeOptions) -> Result<(), PushlineError> {
        self.subscription("push_unsubscribe", SubscriptionStatus::Unsubscribed, options)
            .await
    }

    async fn subscription(
        &self,
        function: &str,
        status: SubscriptionStatus,
        options: SubscribeOptions,
    ) -> Result<(), PushlineError> {
        let kind = OperationKind::Subscribe;
        let ctx = self.ctx();
        let _guard = ctx.queue().lock(kind).await;

        let Some(config) = self.require_config(function).await? else {
            return Ok(());
        };
        if let Err(e) = options.validate() {
            self.bus
                .emit_message(function, EventCode::ValidationFailed, e.to_string());
            return Ok(());
        }
        let Some(auth) = ctx.resolve_auth(&config) else {
            self.bus.emit_code(function, EventCode::AuthUnavailable);
            return Ok(());
        };

        let mut row = SubscribeRow {
            id: 0,
            uid: Uuid::new_v4().to_string(),
            user_tag: auth.user_tag.clone(),
            status,
            sync: options.sync,
            profile_fields: options.profile_fields,
            custom_fields: options.custom_fields,
            cats: options.cats,
            replace: options.replace,
            skip_triggers: options.skip_triggers,
            retry_count: 0,
            max_retry_count: ctx.retry_settings().max_retry_count(kind),
            created_at: now_timestamp(),
        };
        row.id = ctx.store().insert_subscribe(&row).await?;
        debug!(id = row.id, uid = %row.uid, %status, "subscribe row persisted");

        // Earlier intents of this user are still pending; sending now would
        // let this one overtake them.
        let pending = ctx.store().subscribes_by_user_tag(&auth.user_tag).await?;
        if pending.iter().any(|r| r.id < row.id) {
            debug!(uid = %row.uid, "older subscribe rows pending, deferring to retry pass");
            self.retry.schedule_retry(kind);
            return Ok(());
        }

        let token = match ctx.current_token(&config).await {
            Some(token) => Some(token),
            None => ctx.store().saved_token().await?,
        };
        let settled = attempt_subscribe(ctx, &config, &auth, &row, token.as_ref()).await?;
        self.after_attempt(kind, settled);
        Ok(())
    }

    /// Queues and sends a custom analytics event.
    pub async fn send_mobile_event(
        &self,
        request: MobileEventRequest,
    ) -> Result<(), PushlineError> {
        const FUNCTION: &str = "send_mobile_event";
        let kind = OperationKind::MobileEvent;
        let ctx = self.ctx();
        let _guard = ctx.queue().lock(kind).await;

        let Some(config) = self.require_config(FUNCTION).await? else {
            return Ok(());
        };
        if let Err(e) = request.validate() {
            self.bus
                .emit_message(FUNCTION, EventCode::ValidationFailed, e.to_string());
            return Ok(());
        }
        let Some(auth) = ctx.resolve_auth(&config) else {
            self.bus.emit_code(FUNCTION, EventCode::AuthUnavailable);
            return Ok(());
        };

        let mut row = MobileEventRow {
            id: 0,
            uid: Uuid::new_v4().to_string(),
            user_tag: auth.user_tag.clone(),
            time_zone: request.time_zone.unwrap_or_else(local_time_zone),
            sid: request.sid,
            alt_id: request.alt_id,
            event_name: request.event_name,
            payload: request.payload,
            matching: request.matching,
            profile_fields: request.profile_fields,
            sm_id: request.sm_id,
            utm: request.utm,
            retry_count: 0,
            max_retry_count: ctx.retry_settings().max_retry_count(kind),
            created_at: now_timestamp(),
        };
        row.id = ctx.store().insert_mobile_event(&row).await?;
        debug!(id = row.id, event = %row.event_name, "mobile event persisted");

        let settled = attempt_mobile_event(ctx, &config, &auth, &row).await?;
        self.after_attempt(kind, settled);
        Ok(())
    }

    /// Reports a delivery or open of the push message `message_uid`, inside
    /// a foreground window. A report already confirmed or already pending
    /// is not sent again.
    pub async fn report_push_event(
        &self,
        event_type: PushEventType,
        message_uid: &str,
    ) -> Result<(), PushlineError> {
        const FUNCTION: &str = "report_push_event";
        let ctx = self.ctx();
        let Some(config) = self.require_config(FUNCTION).await? else {
            return Ok(());
        };
        if message_uid.trim().is_empty() {
            self.bus.emit_message(
                FUNCTION,
                EventCode::ValidationFailed,
                "message uid must not be empty",
            );
            return Ok(());
        }

        let work = ctx.queue().submit(OperationKind::PushEvent, async {
            self.push_event_locked(&config, event_type, message_uid)
                .await
        });
        ctx.foreground().run(&config, FUNCTION, work).await
    }

    async fn push_event_locked(
        &self,
        config: &PushConfiguration,
        event_type: PushEventType,
        message_uid: &str,
    ) -> Result<(), PushlineError> {
        const FUNCTION: &str = "report_push_event";
        let kind = OperationKind::PushEvent;
        let ctx = self.ctx();
        let duplicate = json!({ "message_uid": message_uid, "type": event_type.to_string() });

        if ctx
            .store()
            .is_push_event_confirmed(message_uid, event_type)
            .await?
        {
            self.bus
                .emit_value(FUNCTION, EventCode::DuplicatePushEvent, duplicate);
            return Ok(());
        }

        let mut row = PushEventRow {
            id: 0,
            message_uid: message_uid.to_string(),
            event_type,
            retry_count: 0,
            max_retry_count: ctx.retry_settings().max_retry_count(kind),
            created_at: now_timestamp(),
        };
        let Some(id) = ctx.store().insert_push_event(&row).await? else {
            self.bus
                .emit_value(FUNCTION, EventCode::DuplicatePushEvent, duplicate);
            return Ok(());
        };
        row.id = id;

        let auth = ctx.resolve_auth(config);
        let settled = attempt_push_event(ctx, config, auth.as_ref(), &row).await?;
        self.after_attempt(kind, settled);
        Ok(())
    }

    /// Asks the push vendors for the current token and, when it differs
    /// from the saved one, reports the change to the server.
    pub async fn update_token(&self) -> Result<(), PushlineError> {
        const FUNCTION: &str = "update_token";
        let kind = OperationKind::TokenUpdate;
        let ctx = self.ctx();
        let _guard = ctx.queue().lock(kind).await;

        let Some(config) = self.require_config(FUNCTION).await? else {
            return Ok(());
        };
        let Some(current) = ctx.current_token(&config).await else {
            self.bus.emit_code(FUNCTION, EventCode::TokenUnavailable);
            return Ok(());
        };
        let saved = ctx.store().saved_token().await?;
        // A pending report is what the server will end up with, so compare
        // against the newest one before falling back to the confirmed token.
        let reported = match ctx
            .store()
            .token_updates()
            .await?
            .into_iter()
            .max_by_key(|row| row.id)
        {
            Some(pending) => Some(DeviceToken {
                provider: pending.new_provider,
                token: pending.new_token,
            }),
            None => saved.clone(),
        };
        if reported.as_ref() == Some(&current) {
            self.bus.emit_code(FUNCTION, EventCode::TokenUnchanged);
            return Ok(());
        }
        if ctx.resolve_auth(&config).is_none() {
            self.bus.emit_code(FUNCTION, EventCode::AuthUnavailable);
            return Ok(());
        }

        let row = TokenUpdateRow {
            id: 0,
            uid: Uuid::new_v4().to_string(),
            old_provider: saved.as_ref().map(|t| t.provider),
            old_token: saved.map(|t| t.token),
            new_provider: current.provider,
            new_token: current.token,
            retry_count: 0,
            max_retry_count: ctx.retry_settings().max_retry_count(kind),
            created_at: now_timestamp(),
        };
        let id = ctx.store().insert_token_update(&row).await?;
        debug!(id, provider = %row.new_provider, "token update persisted");

        // The pass abandons anything this row supersedes before sending it.
        let summary = run_pass(ctx, kind).await?;
        if summary.kept > 0 {
            self.retry.schedule_retry(kind);
        }
        Ok(())
    }

    /// Downloads rich-notification content inside a foreground window.
    /// Returns `None` when the download failed; the failure is reported as
    /// an event.
    pub async fn load_notification_media(
        &self,
        url: &str,
    ) -> Result<Option<Vec<u8>>, PushlineError> {
        const FUNCTION: &str = "load_notification_media";
        let ctx = self.ctx();
        let Some(config) = self.require_config(FUNCTION).await? else {
            return Ok(None);
        };

        let fetched = ctx
            .foreground()
            .run(&config, FUNCTION, ctx.gateway().fetch_media(url))
            .await;
        match fetched {
            Ok(bytes) => {
                self.bus.emit_value(
                    FUNCTION,
                    EventCode::MediaLoaded,
                    json!({ "url": url, "bytes": bytes.len() }),
                );
                Ok(Some(bytes))
            }
            Err(e) => {
                self.bus
                    .emit_message(FUNCTION, EventCode::RequestRejected, e.to_string());
                Ok(None)
            }
        }
    }

    /// Wipes pending rows, configuration and the saved token.
    ///
    /// Scheduled work is cancelled first, then every kind lock is taken so
    /// no submission or retry pass is in flight while the store is cleared.
    pub async fn clear(&self) -> Result<(), PushlineError> {
        self.retry.cancel_all();
        let ctx = self.ctx();
        let _all = ctx.queue().lock_all().await;
        ctx.store().clear_all().await?;
        info!("sdk cleared");
        self.bus.emit_code("clear", EventCode::SdkCleared);
        Ok(())
    }

    /// Runs one retry pass for every kind right away.
    pub async fn retry_now(&self) -> Result<Vec<(OperationKind, PassSummary)>, PushlineError> {
        self.retry.run_all().await
    }

    /// Scheduling state of `kind`.
    pub fn retry_state(&self, kind: OperationKind) -> KindState {
        self.retry.state(kind)
    }

    async fn require_config(
        &self,
        function: &str,
    ) -> Result<Option<PushConfiguration>, PushlineError> {
        let config = self.ctx().store().get_config().await?;
        if config.is_none() {
            self.bus.emit_code(function, EventCode::NotInitialized);
        }
        Ok(config)
    }

    fn after_attempt(&self, kind: OperationKind, settled: Settled) {
        if settled == Settled::Kept {
            self.retry.schedule_retry(kind);
        }
    }
}

impl std::fmt::Debug for Pushline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pushline")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
