// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry passes over a real SQLite store with a scripted gateway.

use std::sync::Arc;
use std::time::Duration;

use pushline_auth::hash_hex;
use pushline_bus::EventBus;
use pushline_config::model::{ForegroundSettings, RetrySettings};
use pushline_core::{
    now_timestamp, DeviceToken, EventCode, MobileEventRow, OperationKind, PushConfiguration,
    PushEventRow, PushEventType, PushProvider, PushStore, SubscribeRow, SubscriptionStatus,
    TokenUpdateRow, UtmTags,
};
use pushline_delivery::{run_pass, DeliveryContext, ForegroundBridge, PassSummary};
use pushline_storage::SqliteStore;
use pushline_test_utils::{MockGateway, MockTokenProvider, RecordingSink, Reply};
use tracing_test::traced_test;

const R_TOKEN: &str = "rtoken-1";

struct Harness {
    store: Arc<SqliteStore>,
    gateway: Arc<MockGateway>,
    sink: Arc<RecordingSink>,
    ctx: DeliveryContext,
}

async fn harness() -> Harness {
    harness_with(Some(R_TOKEN)).await
}

async fn harness_with(r_token: Option<&str>) -> Harness {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    let gateway = Arc::new(MockGateway::new());
    let sink = Arc::new(RecordingSink::new());
    let bus = Arc::new(EventBus::new());
    bus.subscribe(sink.clone());

    let mut config = PushConfiguration::new("https://api.example.test");
    config.r_token = r_token.map(str::to_string);
    store.set_config(&config).await.unwrap();

    let foreground = ForegroundBridge::new(None, bus.clone(), &ForegroundSettings::default());
    let ctx = DeliveryContext::new(
        store.clone(),
        gateway.clone(),
        bus,
        foreground,
        RetrySettings::default(),
    )
    .with_token_provider(Arc::new(MockTokenProvider::new(
        PushProvider::Firebase,
        Some("fcm-token"),
    )));

    Harness {
        store,
        gateway,
        sink,
        ctx,
    }
}

fn user_tag() -> String {
    hash_hex(R_TOKEN.as_bytes())
}

fn subscribe_row(uid: &str, retry_count: i64, max_retry_count: i64) -> SubscribeRow {
    SubscribeRow {
        id: 0,
        uid: uid.to_string(),
        user_tag: user_tag(),
        status: SubscriptionStatus::Subscribed,
        sync: false,
        profile_fields: None,
        custom_fields: None,
        cats: None,
        replace: false,
        skip_triggers: false,
        retry_count,
        max_retry_count,
        created_at: now_timestamp(),
    }
}

fn token_update_row(uid: &str, token: &str) -> TokenUpdateRow {
    TokenUpdateRow {
        id: 0,
        uid: uid.to_string(),
        old_provider: None,
        old_token: None,
        new_provider: PushProvider::Firebase,
        new_token: token.to_string(),
        retry_count: 0,
        max_retry_count: 5,
        created_at: now_timestamp(),
    }
}

fn push_event_row(message_uid: &str, retry_count: i64, max_retry_count: i64) -> PushEventRow {
    PushEventRow {
        id: 0,
        message_uid: message_uid.to_string(),
        event_type: PushEventType::Delivery,
        retry_count,
        max_retry_count,
        created_at: now_timestamp(),
    }
}

fn mobile_event_row(uid: &str) -> MobileEventRow {
    MobileEventRow {
        id: 0,
        uid: uid.to_string(),
        user_tag: user_tag(),
        time_zone: 180,
        sid: "stream".to_string(),
        alt_id: None,
        event_name: "purchase".to_string(),
        payload: Some(serde_json::json!({ "sum": 10 })),
        matching: None,
        profile_fields: None,
        sm_id: None,
        utm: UtmTags::default(),
        retry_count: 0,
        max_retry_count: 3,
        created_at: now_timestamp(),
    }
}

#[tokio::test]
async fn empty_pass_is_a_noop_for_every_kind() {
    let h = harness().await;

    for kind in OperationKind::ALL {
        let summary = run_pass(&h.ctx, kind).await.unwrap();
        assert_eq!(summary, PassSummary::default(), "{kind}");
    }

    assert!(h.sink.is_empty());
    assert!(h.gateway.calls().is_empty());
    assert!(h.store.saved_token().await.unwrap().is_none());
}

#[tokio::test]
async fn pass_without_configuration_touches_nothing() {
    let h = harness().await;
    h.store.insert_push_event(&push_event_row("m-1", 0, 3)).await.unwrap();
    h.store.delete_config().await.unwrap();

    let summary = run_pass(&h.ctx, OperationKind::PushEvent).await.unwrap();

    assert_eq!(summary, PassSummary::default());
    assert!(h.gateway.calls().is_empty());
    assert_eq!(h.store.count_all(OperationKind::PushEvent).await.unwrap(), 1);
}

#[tokio::test]
async fn subscribe_retry_increments_count_by_one() {
    let h = harness().await;
    h.store.insert_subscribe(&subscribe_row("s-1", 1, 5)).await.unwrap();
    h.gateway.push_reply(OperationKind::Subscribe, Reply::Retry);

    let summary = run_pass(&h.ctx, OperationKind::Subscribe).await.unwrap();

    assert_eq!(summary.kept, 1);
    assert!(summary.remaining);
    let rows = h.store.subscribes_by_user_tag(&user_tag()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].retry_count, 2);
    assert_eq!(h.sink.codes(), vec![EventCode::RequestRetry.code()]);
}

#[tokio::test]
async fn row_at_limit_is_dropped_with_one_event() {
    let h = harness().await;
    h.store.insert_push_event(&push_event_row("m-1", 3, 3)).await.unwrap();
    h.gateway.push_reply(OperationKind::PushEvent, Reply::Retry);

    let summary = run_pass(&h.ctx, OperationKind::PushEvent).await.unwrap();

    assert_eq!(summary.dropped, 1);
    assert!(!summary.remaining);
    assert_eq!(h.store.count_all(OperationKind::PushEvent).await.unwrap(), 0);
    assert_eq!(h.sink.events().len(), 1);
    assert_eq!(h.sink.count(EventCode::RetryLimitExceeded), 1);
    assert_eq!(h.sink.count(EventCode::RequestRetry), 0);

    let event = &h.sink.events()[0];
    let value = event.value.as_ref().unwrap();
    assert_eq!(value["kind"], "push_event");
    assert_eq!(value["retry_count"], 3);
}

#[tokio::test]
async fn retry_count_never_exceeds_max_after_repeated_passes() {
    let h = harness().await;
    h.gateway.set_default(OperationKind::PushEvent, Reply::Retry);
    for (i, start) in [0, 1, 2, 3].into_iter().enumerate() {
        h.store
            .insert_push_event(&push_event_row(&format!("m-{i}"), start, 3))
            .await
            .unwrap();
    }

    for _ in 0..5 {
        run_pass(&h.ctx, OperationKind::PushEvent).await.unwrap();
        for row in h.store.push_events().await.unwrap() {
            assert!(row.retry_count <= row.max_retry_count, "{row:?}");
        }
    }

    assert_eq!(h.store.count_all(OperationKind::PushEvent).await.unwrap(), 0);
    assert_eq!(h.sink.count(EventCode::RetryLimitExceeded), 4);
}

#[tokio::test]
async fn success_deletes_and_failure_deletes_with_error() {
    let h = harness().await;
    h.store.insert_push_event(&push_event_row("ok", 0, 3)).await.unwrap();
    h.store.insert_push_event(&push_event_row("bad", 0, 3)).await.unwrap();
    h.gateway.push_reply(OperationKind::PushEvent, Reply::Success);
    h.gateway.push_reply(OperationKind::PushEvent, Reply::Failure);

    let summary = run_pass(&h.ctx, OperationKind::PushEvent).await.unwrap();

    assert_eq!(summary.confirmed, 1);
    assert_eq!(summary.rejected, 1);
    assert!(!summary.remaining);
    assert_eq!(h.store.count_all(OperationKind::PushEvent).await.unwrap(), 0);
    assert_eq!(h.sink.count(EventCode::PushEventSent), 1);
    assert_eq!(h.sink.count(EventCode::RequestRejected), 1);

    // Rows are attempted in id order, so "ok" takes the first scripted reply.
    assert!(h
        .store
        .is_push_event_confirmed("ok", PushEventType::Delivery)
        .await
        .unwrap());
    assert!(!h
        .store
        .is_push_event_confirmed("bad", PushEventType::Delivery)
        .await
        .unwrap());
}

#[tokio::test]
async fn stale_token_update_is_abandoned() {
    let h = harness().await;
    h.store
        .insert_token_update(&token_update_row("t-old", "token-a"))
        .await
        .unwrap();
    h.store
        .insert_token_update(&token_update_row("t-new", "token-b"))
        .await
        .unwrap();

    let summary = run_pass(&h.ctx, OperationKind::TokenUpdate).await.unwrap();

    assert_eq!(summary.abandoned, 1);
    assert_eq!(summary.confirmed, 1);
    let calls = h.gateway.calls_for(OperationKind::TokenUpdate);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].uid, "t-new");
    assert_eq!(h.sink.count(EventCode::StaleTokenUpdate), 1);
    assert_eq!(h.store.count_all(OperationKind::TokenUpdate).await.unwrap(), 0);
    assert_eq!(
        h.store.saved_token().await.unwrap(),
        Some(DeviceToken {
            provider: PushProvider::Firebase,
            token: "token-b".to_string(),
        })
    );
}

#[tokio::test]
async fn subscribe_pass_stops_at_first_retry() {
    let h = harness().await;
    h.store.insert_subscribe(&subscribe_row("first", 0, 5)).await.unwrap();
    h.store.insert_subscribe(&subscribe_row("second", 0, 5)).await.unwrap();
    h.gateway.push_reply(OperationKind::Subscribe, Reply::Retry);

    let summary = run_pass(&h.ctx, OperationKind::Subscribe).await.unwrap();

    assert_eq!(summary.kept, 1);
    assert_eq!(summary.attempted(), 1);
    let calls = h.gateway.calls_for(OperationKind::Subscribe);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].uid, "first");
    assert_eq!(
        h.store.subscribes_by_user_tag(&user_tag()).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn confirmed_subscribe_saves_the_current_token() {
    let h = harness().await;
    h.store.insert_subscribe(&subscribe_row("s-1", 0, 5)).await.unwrap();

    let summary = run_pass(&h.ctx, OperationKind::Subscribe).await.unwrap();

    assert_eq!(summary.confirmed, 1);
    let call = &h.gateway.calls_for(OperationKind::Subscribe)[0];
    assert_eq!(call.auth_header.as_deref(), Some("Bearer rtoken@rtoken-1"));
    let saved = h.store.saved_token().await.unwrap().unwrap();
    assert_eq!(saved.token, "fcm-token");
    assert_eq!(h.sink.count(EventCode::SubscribeSent), 1);
}

#[tokio::test]
async fn unresolved_identity_leaves_rows_untouched() {
    let h = harness_with(None).await;
    h.store.insert_subscribe(&subscribe_row("s-1", 0, 5)).await.unwrap();
    h.store.insert_mobile_event(&mobile_event_row("e-1")).await.unwrap();

    let subscribe = run_pass(&h.ctx, OperationKind::Subscribe).await.unwrap();
    let mobile = run_pass(&h.ctx, OperationKind::MobileEvent).await.unwrap();

    assert!(subscribe.remaining);
    assert!(mobile.remaining);
    assert_eq!(subscribe.attempted() + mobile.attempted(), 0);
    assert!(h.gateway.calls().is_empty());
    assert!(h.sink.is_empty());
}

#[tokio::test]
async fn mobile_events_fan_out_concurrently() {
    let h = harness().await;
    h.gateway.set_delay(Duration::from_millis(50));
    for uid in ["e-1", "e-2", "e-3"] {
        h.store.insert_mobile_event(&mobile_event_row(uid)).await.unwrap();
    }

    let summary = run_pass(&h.ctx, OperationKind::MobileEvent).await.unwrap();

    assert_eq!(summary.confirmed, 3);
    assert_eq!(h.gateway.max_concurrent(OperationKind::MobileEvent), 3);
    assert_eq!(h.sink.count(EventCode::MobileEventSent), 3);
}

#[tokio::test]
#[traced_test]
async fn finished_pass_is_logged() {
    let h = harness().await;
    h.store.insert_push_event(&push_event_row("m-1", 0, 3)).await.unwrap();

    run_pass(&h.ctx, OperationKind::PushEvent).await.unwrap();

    assert!(logs_contain("retry pass finished"));
}

#[tokio::test]
async fn rows_of_a_previous_user_expire_after_retention() {
    let h = harness().await;
    let mut stale = subscribe_row("s-old", 0, 5);
    stale.user_tag = hash_hex(b"previous-user");
    stale.created_at = "2020-01-01T00:00:00.000Z".to_string();
    h.store.insert_subscribe(&stale).await.unwrap();
    let mut recent = subscribe_row("s-recent", 0, 5);
    recent.user_tag = hash_hex(b"previous-user");
    h.store.insert_subscribe(&recent).await.unwrap();
    let mut own_old = subscribe_row("s-own", 0, 5);
    own_old.created_at = "2020-01-01T00:00:00.000Z".to_string();
    h.store.insert_subscribe(&own_old).await.unwrap();

    let summary = run_pass(&h.ctx, OperationKind::Subscribe).await.unwrap();

    assert_eq!(summary.expired, 1);
    assert_eq!(summary.confirmed, 1);
    assert_eq!(h.store.count_all(OperationKind::Subscribe).await.unwrap(), 1);
}

#[tokio::test]
async fn push_event_pass_prunes_nothing_recent() {
    let h = harness().await;
    h.store.insert_push_event(&push_event_row("m-1", 0, 3)).await.unwrap();

    run_pass(&h.ctx, OperationKind::PushEvent).await.unwrap();
    let summary = run_pass(&h.ctx, OperationKind::PushEvent).await.unwrap();

    assert_eq!(summary.expired, 0);
    assert!(h
        .store
        .is_push_event_confirmed("m-1", PushEventType::Delivery)
        .await
        .unwrap());
}
