// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock network request layer for deterministic testing.
//!
//! `MockGateway` implements `PushGateway` with scripted outcomes, records
//! every call and tracks how many calls of each kind overlap.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pushline_core::{
    AuthContext, DeviceToken, EventCode, MobileEventRow, OperationKind, PushConfiguration,
    PushEventRow, PushGateway, PushlineError, RequestOutcome, SdkEvent, SubscribeRow,
    TokenUpdateRow,
};

/// Scripted classification of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Success,
    Failure,
    Retry,
}

impl Reply {
    fn outcome(self, kind: OperationKind) -> RequestOutcome {
        let function = kind.to_string();
        match self {
            Reply::Success => {
                RequestOutcome::Success(SdkEvent::from_code(function, EventCode::confirmed(kind)))
            }
            Reply::Failure => {
                RequestOutcome::Failure(SdkEvent::from_code(function, EventCode::RequestRejected))
            }
            Reply::Retry => {
                RequestOutcome::Retry(SdkEvent::from_code(function, EventCode::RequestRetry))
            }
        }
    }
}

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCall {
    pub kind: OperationKind,
    pub row_id: i64,
    /// Row uid, or the message uid for push events.
    pub uid: String,
    pub auth_header: Option<String>,
    pub token: Option<DeviceToken>,
}

/// A gateway that returns pre-configured outcomes.
///
/// Per-kind replies are popped from a FIFO queue; when a queue is empty the
/// kind's default reply ([`Reply::Success`] unless changed) is used.
#[derive(Debug, Default)]
pub struct MockGateway {
    scripted: Mutex<HashMap<OperationKind, VecDeque<Reply>>>,
    defaults: Mutex<HashMap<OperationKind, Reply>>,
    calls: Mutex<Vec<GatewayCall>>,
    delay: Mutex<Option<Duration>>,
    media: Mutex<HashMap<String, Vec<u8>>>,
    in_flight: [AtomicUsize; 4],
    max_in_flight: [AtomicUsize; 4],
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `reply` for the next call of `kind`.
    pub fn push_reply(&self, kind: OperationKind, reply: Reply) {
        lock(&self.scripted).entry(kind).or_default().push_back(reply);
    }

    /// Reply used for `kind` once its queue is empty.
    pub fn set_default(&self, kind: OperationKind, reply: Reply) {
        lock(&self.defaults).insert(kind, reply);
    }

    /// Make every call take `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    /// Serve `bytes` for `url` from `fetch_media`.
    pub fn add_media(&self, url: &str, bytes: Vec<u8>) {
        lock(&self.media).insert(url.to_string(), bytes);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.calls).clone()
    }

    pub fn calls_for(&self, kind: OperationKind) -> Vec<GatewayCall> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.kind == kind)
            .cloned()
            .collect()
    }

    /// Highest number of simultaneously running calls seen for `kind`.
    pub fn max_concurrent(&self, kind: OperationKind) -> usize {
        self.max_in_flight[kind.index()].load(Ordering::SeqCst)
    }

    async fn attempt(&self, call: GatewayCall) -> RequestOutcome {
        let kind = call.kind;
        let slot = kind.index();
        let now = self.in_flight[slot].fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight[slot].fetch_max(now, Ordering::SeqCst);
        lock(&self.calls).push(call);

        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = lock(&self.scripted)
            .get_mut(&kind)
            .and_then(VecDeque::pop_front)
            .or_else(|| lock(&self.defaults).get(&kind).copied())
            .unwrap_or(Reply::Success);

        self.in_flight[slot].fetch_sub(1, Ordering::SeqCst);
        reply.outcome(kind)
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

#[async_trait]
impl PushGateway for MockGateway {
    async fn subscribe(
        &self,
        _config: &PushConfiguration,
        auth: &AuthContext,
        row: &SubscribeRow,
        token: Option<&DeviceToken>,
    ) -> RequestOutcome {
        self.attempt(GatewayCall {
            kind: OperationKind::Subscribe,
            row_id: row.id,
            uid: row.uid.clone(),
            auth_header: Some(auth.header.clone()),
            token: token.cloned(),
        })
        .await
    }

    async fn update_token(
        &self,
        _config: &PushConfiguration,
        auth: &AuthContext,
        row: &TokenUpdateRow,
    ) -> RequestOutcome {
        self.attempt(GatewayCall {
            kind: OperationKind::TokenUpdate,
            row_id: row.id,
            uid: row.uid.clone(),
            auth_header: Some(auth.header.clone()),
            token: Some(DeviceToken {
                provider: row.new_provider,
                token: row.new_token.clone(),
            }),
        })
        .await
    }

    async fn push_event(
        &self,
        _config: &PushConfiguration,
        auth: Option<&AuthContext>,
        row: &PushEventRow,
    ) -> RequestOutcome {
        self.attempt(GatewayCall {
            kind: OperationKind::PushEvent,
            row_id: row.id,
            uid: row.message_uid.clone(),
            auth_header: auth.map(|a| a.header.clone()),
            token: None,
        })
        .await
    }

    async fn mobile_event(
        &self,
        _config: &PushConfiguration,
        auth: &AuthContext,
        row: &MobileEventRow,
    ) -> RequestOutcome {
        self.attempt(GatewayCall {
            kind: OperationKind::MobileEvent,
            row_id: row.id,
            uid: row.uid.clone(),
            auth_header: Some(auth.header.clone()),
            token: None,
        })
        .await
    }

    async fn fetch_media(&self, url: &str) -> Result<Vec<u8>, PushlineError> {
        lock(&self.media)
            .get(url)
            .cloned()
            .ok_or_else(|| PushlineError::Network {
                message: format!("no media registered for {url}"),
                source: None,
            })
    }
}
