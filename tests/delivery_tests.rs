mod common;

use std::time::Duration;

use buildnotify::NotifyError;
use buildnotify::clients::WebhookResolver;
use buildnotify::core::Secret;
use buildnotify::slack::{Delivery, Endpoint, Message, SlackClient};
use common::MockServer;

fn message() -> Message {
    Message {
        channel: "#builds".to_string(),
        text: "Build finished".to_string(),
        ..Message::default()
    }
}

fn token() -> Secret {
    Secret::new("xoxb-test")
}

#[tokio::test]
async fn api_delivery_posts_to_post_message_with_bearer_token() {
    let server = MockServer::start().await;
    let client = SlackClient::new().with_api_base_url(&server.base_url);
    let handle =
        server.respond_once(200, r#"{"ok":true,"channel":"C123","ts":"1700000000.000100"}"#);

    let msg = message();
    let delivery = client
        .send(&msg, &Endpoint::api(token(), &msg))
        .await
        .expect("send should succeed");
    let requests = handle.await.unwrap();

    assert_eq!(delivery.thread_ts(), Some("1700000000.000100"));
    let req = &requests[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/chat.postMessage");
    assert_eq!(req.header("authorization"), Some("Bearer xoxb-test"));
    assert_eq!(
        req.header("content-type"),
        Some("application/json; charset=utf-8")
    );
    assert_eq!(req.json()["channel"], "#builds");
    assert_eq!(req.json()["text"], "Build finished");
}

#[tokio::test]
async fn api_delivery_with_ts_targets_chat_update() {
    let server = MockServer::start().await;
    let client = SlackClient::new().with_api_base_url(&server.base_url);
    let handle = server.respond_once(200, r#"{"ok":true,"ts":"1700000000.000100"}"#);

    let msg = Message {
        ts: "1700000000.000100".to_string(),
        ..message()
    };
    client.send(&msg, &Endpoint::api(token(), &msg)).await.unwrap();
    let requests = handle.await.unwrap();

    assert_eq!(requests[0].path, "/chat.update");
    assert_eq!(requests[0].json()["ts"], "1700000000.000100");
}

#[tokio::test]
async fn webhook_delivery_has_no_auth_header_and_unparsed_body() {
    let server = MockServer::start().await;
    let hook = Endpoint::Webhook(Secret::new(server.url("/services/T000/B000/XXXX")));
    let handle = server.respond_once(200, "ok");

    let delivery = SlackClient::new().send(&message(), &hook).await.unwrap();
    let requests = handle.await.unwrap();

    assert_eq!(
        delivery,
        Delivery::Webhook {
            body: "ok".to_string()
        }
    );
    assert_eq!(delivery.thread_ts(), None);
    assert_eq!(requests[0].path, "/services/T000/B000/XXXX");
    assert!(requests[0].header("authorization").is_none());
}

#[tokio::test]
async fn non_success_status_carries_status_and_body() {
    let server = MockServer::start().await;
    let hook = Endpoint::Webhook(Secret::new(server.url("/hook")));
    let handle = server.respond_once(404, "no_service");

    let err = SlackClient::new().send(&message(), &hook).await.unwrap_err();
    handle.await.unwrap();

    match err {
        NotifyError::Delivery { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(body, "no_service");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_from_slack_is_reported_after_one_attempt() {
    let server = MockServer::start().await;
    let client = SlackClient::new().with_api_base_url(&server.base_url);
    let handle = server.respond_once(500, "boom");

    let msg = message();
    let err = client
        .send(&msg, &Endpoint::api(token(), &msg))
        .await
        .unwrap_err();
    let requests = handle.await.unwrap();

    assert!(matches!(err, NotifyError::Delivery { .. }));
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn api_error_envelope_is_a_failure() {
    let server = MockServer::start().await;
    let client = SlackClient::new().with_api_base_url(&server.base_url);
    let handle = server.respond_once(200, r#"{"ok":false,"error":"channel_not_found"}"#);

    let msg = message();
    let err = client
        .send(&msg, &Endpoint::api(token(), &msg))
        .await
        .unwrap_err();
    handle.await.unwrap();

    assert!(matches!(err, NotifyError::Api(ref m) if m.contains("channel_not_found")));
}

#[tokio::test]
async fn undecodable_api_body_is_a_parse_error() {
    let server = MockServer::start().await;
    let client = SlackClient::new().with_api_base_url(&server.base_url);
    let handle = server.respond_once(200, "ok");

    let msg = message();
    let err = client
        .send(&msg, &Endpoint::api(token(), &msg))
        .await
        .unwrap_err();
    handle.await.unwrap();

    assert!(matches!(err, NotifyError::ResponseParse(_)));
}

#[tokio::test]
async fn resolver_returns_integration_webhook() {
    let server = MockServer::start().await;
    let build_url = server.url("/build/abc");
    let handle = server.respond_once(
        200,
        r#"{"webhook_url":"https://hooks.slack.com/services/T/B/resolved"}"#,
    );

    let url = WebhookResolver::new()
        .resolve("int-1", &build_url, &Secret::new("build-token"))
        .await
        .unwrap();
    let requests = handle.await.unwrap();

    assert_eq!(url.expose(), "https://hooks.slack.com/services/T/B/resolved");
    let req = &requests[0];
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, "/build/abc/integrations/slack/int-1");
    assert_eq!(req.header("build-api-token"), Some("build-token"));
}

#[tokio::test]
async fn resolver_retries_server_errors() {
    let server = MockServer::start().await;
    let build_url = server.url("/build/abc");
    let handle = server.respond(vec![
        (503, "unavailable"),
        (502, "bad gateway"),
        (200, r#"{"webhook_url":"https://hooks.slack.com/services/T/B/X"}"#),
    ]);

    let url = WebhookResolver::new()
        .with_base_delay(Duration::from_millis(1))
        .resolve("int-1", &build_url, &Secret::new("build-token"))
        .await
        .unwrap();
    let requests = handle.await.unwrap();

    assert_eq!(url.expose(), "https://hooks.slack.com/services/T/B/X");
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn resolver_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    let build_url = server.url("/build/abc");
    let handle = server.respond_once(404, r#"{"message":"not found"}"#);

    let err = WebhookResolver::new()
        .with_base_delay(Duration::from_millis(1))
        .resolve("missing", &build_url, &Secret::new("build-token"))
        .await
        .unwrap_err();
    let requests = handle.await.unwrap();

    assert_eq!(requests.len(), 1);
    match err {
        NotifyError::Resolution { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert!(body.contains("not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn resolver_rejects_malformed_body() {
    let server = MockServer::start().await;
    let build_url = server.url("/build/abc");
    let handle = server.respond_once(200, r#"{"url":"nope"}"#);

    let err = WebhookResolver::new()
        .with_base_delay(Duration::from_millis(1))
        .resolve("int-1", &build_url, &Secret::new("build-token"))
        .await
        .unwrap_err();
    let requests = handle.await.unwrap();

    assert_eq!(requests.len(), 1);
    assert!(matches!(err, NotifyError::Resolution { .. }));
}
