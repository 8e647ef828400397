// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ApiClient against a wiremock server.

use std::time::Duration;

use pushline_config::model::NetworkSettings;
use pushline_core::{
    AuthContext, DeviceToken, EventCode, MatchingMode, MobileEventRow, OperationKind,
    PushConfiguration, PushEventRow, PushEventType, PushGateway, PushProvider, RequestOutcome,
    SdkEvent, SubscribeRow, SubscriptionStatus, TokenUpdateRow, UtmTags,
};
use pushline_net::{ApiClient, HttpReply, ResponseClassifier};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> ApiClient {
    ApiClient::new(&NetworkSettings {
        timeout_secs: 2,
        user_agent: "pushline-test".into(),
    })
    .unwrap()
}

fn config(server: &MockServer) -> PushConfiguration {
    PushConfiguration::new(format!("{}/", server.uri()))
}

fn rtoken_auth() -> AuthContext {
    AuthContext {
        header: "Bearer rtoken@secret".into(),
        matching_mode: MatchingMode::RToken,
        user_tag: "tag".into(),
    }
}

fn subscribe_row(status: SubscriptionStatus) -> SubscribeRow {
    SubscribeRow {
        id: 1,
        uid: "sub-1".into(),
        user_tag: "tag".into(),
        status,
        sync: true,
        profile_fields: Some(json!({"email": "a@example.com"})),
        custom_fields: None,
        cats: Some(vec!["news".into()]),
        replace: false,
        skip_triggers: false,
        retry_count: 0,
        max_retry_count: 5,
        created_at: "2026-01-01T00:00:00.000Z".into(),
    }
}

fn push_row(event_type: PushEventType) -> PushEventRow {
    PushEventRow {
        id: 7,
        message_uid: "msg-1".into(),
        event_type,
        retry_count: 0,
        max_retry_count: 5,
        created_at: "2026-01-01T00:00:00.000Z".into(),
    }
}

#[tokio::test]
async fn subscribe_posts_body_with_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscription/push/subscribe/"))
        .and(header("authorization", "Bearer rtoken@secret"))
        .and(body_partial_json(json!({
            "uid": "sub-1",
            "matching": "push",
            "push_provider": "android-firebase",
            "push_token": "fcm-token",
            "cats": ["news"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let token = DeviceToken {
        provider: PushProvider::Firebase,
        token: "fcm-token".into(),
    };
    let outcome = client()
        .subscribe(
            &config(&server),
            &rtoken_auth(),
            &subscribe_row(SubscriptionStatus::Subscribed),
            Some(&token),
        )
        .await;

    let RequestOutcome::Success(event) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert!(event.is(EventCode::SubscribeSent));
    assert_eq!(event.function, "push_subscribe");
}

#[tokio::test]
async fn unsubscribe_uses_its_own_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscription/push/unsubscribe/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client()
        .subscribe(
            &config(&server),
            &rtoken_auth(),
            &subscribe_row(SubscriptionStatus::Unsubscribed),
            None,
        )
        .await;
    assert!(matches!(outcome, RequestOutcome::Success(_)));
}

#[tokio::test]
async fn server_error_is_retry_and_client_error_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/event/push/deliver/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/event/push/open/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown message"))
        .mount(&server)
        .await;

    let api = client();
    let cfg = config(&server);

    let deliver = api
        .push_event(&cfg, None, &push_row(PushEventType::Delivery))
        .await;
    assert!(deliver.is_retry());
    assert!(deliver.event().message.contains("maintenance"));

    let open = api.push_event(&cfg, None, &push_row(PushEventType::Open)).await;
    let RequestOutcome::Failure(event) = open else {
        panic!("expected failure, got {open:?}");
    };
    assert!(event.is(EventCode::RequestRejected));
}

#[tokio::test]
async fn non_zero_error_field_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscription/push/update/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": 12, "message": "token belongs to another app"})),
        )
        .mount(&server)
        .await;

    let row = TokenUpdateRow {
        id: 1,
        uid: "tu-1".into(),
        old_provider: None,
        old_token: None,
        new_provider: PushProvider::RuStore,
        new_token: "rs".into(),
        retry_count: 0,
        max_retry_count: 5,
        created_at: "2026-01-01T00:00:00.000Z".into(),
    };
    let outcome = client()
        .update_token(&config(&server), &rtoken_auth(), &row)
        .await;
    let RequestOutcome::Failure(event) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(event.message, "token belongs to another app");
}

#[tokio::test]
async fn timeout_is_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/event/post/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let row = MobileEventRow {
        id: 1,
        uid: "me-1".into(),
        user_tag: "tag".into(),
        time_zone: 0,
        sid: "pixel".into(),
        alt_id: None,
        event_name: "open_app".into(),
        payload: None,
        matching: None,
        profile_fields: None,
        sm_id: None,
        utm: UtmTags::default(),
        retry_count: 0,
        max_retry_count: 5,
        created_at: "2026-01-01T00:00:00.000Z".into(),
    };
    let outcome = client()
        .mobile_event(&config(&server), &rtoken_auth(), &row)
        .await;
    assert!(outcome.is_retry());
    assert!(outcome.event().is(EventCode::RequestRetry));
}

#[tokio::test]
async fn unreachable_host_is_retry() {
    // Nothing listens on the discard port.
    let cfg = PushConfiguration::new("http://127.0.0.1:9");
    let outcome = client()
        .push_event(&cfg, None, &push_row(PushEventType::Delivery))
        .await;
    assert!(outcome.is_retry());
}

#[tokio::test]
async fn invalid_header_is_failure_without_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let auth = AuthContext {
        header: "Bearer bad\nvalue".into(),
        ..rtoken_auth()
    };
    let outcome = client()
        .subscribe(
            &config(&server),
            &auth,
            &subscribe_row(SubscriptionStatus::Subscribed),
            None,
        )
        .await;
    assert!(matches!(outcome, RequestOutcome::Failure(_)));
}

struct AlwaysRetry;

impl ResponseClassifier for AlwaysRetry {
    fn classify(
        &self,
        _kind: OperationKind,
        function: &str,
        _reply: &HttpReply,
    ) -> RequestOutcome {
        RequestOutcome::Retry(SdkEvent::from_code(function, EventCode::RequestRetry))
    }
}

#[tokio::test]
async fn per_kind_classifier_override() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = client().with_classifier(OperationKind::PushEvent, AlwaysRetry);
    let cfg = config(&server);

    let push = api
        .push_event(&cfg, None, &push_row(PushEventType::Open))
        .await;
    assert!(push.is_retry());

    let sub = api
        .subscribe(
            &cfg,
            &rtoken_auth(),
            &subscribe_row(SubscriptionStatus::Suspended),
            None,
        )
        .await;
    assert!(matches!(sub, RequestOutcome::Success(_)));
}

#[tokio::test]
async fn fetch_media_returns_bytes_or_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = client();
    let bytes = api
        .fetch_media(&format!("{}/img.png", server.uri()))
        .await
        .unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);

    let err = api
        .fetch_media(&format!("{}/missing.png", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, pushline_core::PushlineError::Network { .. }));
}
