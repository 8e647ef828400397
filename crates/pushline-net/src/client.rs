// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the marketing API.
//!
//! Provides [`ApiClient`], which builds request bodies, sets the
//! `Authorization` header and hands every attempt to a classifier.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pushline_config::model::NetworkSettings;
use pushline_core::{
    AuthContext, DeviceToken, MobileEventRow, OperationKind, PushConfiguration, PushEventRow,
    PushGateway, PushlineError, RequestOutcome, SubscribeRow, SubscriptionStatus, TokenUpdateRow,
};
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use tracing::{debug, warn};

use crate::body::{MobileEventBody, PushEventBody, SubscribeBody, TokenUpdateBody};
use crate::classifier::{DefaultClassifier, HttpReply, ResponseClassifier};
use crate::endpoints;

/// reqwest-backed [`PushGateway`].
///
/// Performs exactly one attempt per call. Classification defaults to
/// [`DefaultClassifier`] and can be overridden per operation kind.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    default_classifier: Arc<dyn ResponseClassifier>,
    overrides: HashMap<OperationKind, Arc<dyn ResponseClassifier>>,
}

impl ApiClient {
    /// Creates a client with the configured timeout and user agent.
    pub fn new(settings: &NetworkSettings) -> Result<Self, PushlineError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| PushlineError::Network {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self::with_client(client))
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            default_classifier: Arc::new(DefaultClassifier),
            overrides: HashMap::new(),
        }
    }

    /// Overrides the classifier for one operation kind.
    pub fn with_classifier(
        mut self,
        kind: OperationKind,
        classifier: impl ResponseClassifier,
    ) -> Self {
        self.overrides.insert(kind, Arc::new(classifier));
        self
    }

    fn classifier(&self, kind: OperationKind) -> &dyn ResponseClassifier {
        Arc::as_ref(self.overrides.get(&kind).unwrap_or(&self.default_classifier))
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        kind: OperationKind,
        function: &str,
        url: String,
        auth: Option<&AuthContext>,
        body: &B,
    ) -> RequestOutcome {
        let classifier = self.classifier(kind);

        let mut request = self.client.post(&url).json(body);
        if let Some(auth) = auth {
            request = request.header(AUTHORIZATION, auth.header.as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%kind, url = %url, error = %e, "request failed without a response");
                return classifier.classify_transport(function, &e);
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(%kind, status, error = %e, "failed to read response body");
                return classifier.classify_transport(function, &e);
            }
        };
        debug!(%kind, url = %url, status, "response received");

        classifier.classify(kind, function, &HttpReply::new(status, body))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn subscribe_function(status: SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Subscribed => "push_subscribe",
        SubscriptionStatus::Suspended => "push_suspend",
        SubscriptionStatus::Unsubscribed => "push_unsubscribe",
    }
}

#[async_trait]
impl PushGateway for ApiClient {
    async fn subscribe(
        &self,
        config: &PushConfiguration,
        auth: &AuthContext,
        row: &SubscribeRow,
        token: Option<&DeviceToken>,
    ) -> RequestOutcome {
        let url = endpoints::join(&config.api_url, endpoints::for_status(row.status));
        let body = SubscribeBody::new(auth, row, token, config.app_info.as_ref());
        self.post(
            OperationKind::Subscribe,
            subscribe_function(row.status),
            url,
            Some(auth),
            &body,
        )
        .await
    }

    async fn update_token(
        &self,
        config: &PushConfiguration,
        auth: &AuthContext,
        row: &TokenUpdateRow,
    ) -> RequestOutcome {
        let url = endpoints::join(&config.api_url, endpoints::TOKEN_UPDATE);
        let body = TokenUpdateBody::new(auth, row, config.app_info.as_ref());
        self.post(OperationKind::TokenUpdate, "update_token", url, Some(auth), &body)
            .await
    }

    async fn push_event(
        &self,
        config: &PushConfiguration,
        auth: Option<&AuthContext>,
        row: &PushEventRow,
    ) -> RequestOutcome {
        let url = endpoints::join(&config.api_url, endpoints::for_push_event(row.event_type));
        let body = PushEventBody::from(row);
        self.post(OperationKind::PushEvent, "report_push_event", url, auth, &body)
            .await
    }

    async fn mobile_event(
        &self,
        config: &PushConfiguration,
        auth: &AuthContext,
        row: &MobileEventRow,
    ) -> RequestOutcome {
        let url = endpoints::join(&config.api_url, endpoints::MOBILE_EVENT);
        let body = MobileEventBody::new(auth, row);
        self.post(OperationKind::MobileEvent, "send_mobile_event", url, Some(auth), &body)
            .await
    }

    async fn fetch_media(&self, url: &str) -> Result<Vec<u8>, PushlineError> {
        let network_err = |e: reqwest::Error| PushlineError::Network {
            message: format!("media download failed: {e}"),
            source: Some(Box::new(e)),
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(network_err)?;
        let bytes = response.bytes().await.map_err(network_err)?;
        debug!(url, len = bytes.len(), "media downloaded");
        Ok(bytes.to_vec())
    }
}
