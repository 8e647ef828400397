// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network request layer trait.

use async_trait::async_trait;

use crate::error::PushlineError;
use crate::events::RequestOutcome;
use crate::types::{
    AuthContext, DeviceToken, MobileEventRow, PushConfiguration, PushEventRow, SubscribeRow,
    TokenUpdateRow,
};

/// One method per request kind. Each call performs exactly one attempt and
/// classifies it; retrying is the caller's business.
#[async_trait]
pub trait PushGateway: Send + Sync + 'static {
    /// Sends a subscribe/suspend/unsubscribe intent.
    async fn subscribe(
        &self,
        config: &PushConfiguration,
        auth: &AuthContext,
        row: &SubscribeRow,
        token: Option<&DeviceToken>,
    ) -> RequestOutcome;

    /// Reports a device token change.
    async fn update_token(
        &self,
        config: &PushConfiguration,
        auth: &AuthContext,
        row: &TokenUpdateRow,
    ) -> RequestOutcome;

    /// Reports a delivery or open event. Push events are keyed by message
    /// uid, so the identity header is optional.
    async fn push_event(
        &self,
        config: &PushConfiguration,
        auth: Option<&AuthContext>,
        row: &PushEventRow,
    ) -> RequestOutcome;

    /// Sends a custom analytics event.
    async fn mobile_event(
        &self,
        config: &PushConfiguration,
        auth: &AuthContext,
        row: &MobileEventRow,
    ) -> RequestOutcome;

    /// Downloads rich-notification content.
    async fn fetch_media(&self, url: &str) -> Result<Vec<u8>, PushlineError>;
}
