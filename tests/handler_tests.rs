use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alert_relay::api::handler::{Relay, build_relay, handler};
use alert_relay::core::config::{AppConfig, RetryPolicy};
use alert_relay::errors::RelayError;
use alert_relay::telegram::TelegramClient;
use lambda_runtime::{Context, LambdaEvent};
use serde_json::{Value, json};
use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};
use url::Url;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEND_PATH: &str = "/bot42:relay/sendMessage";

fn relay(api_base: &str, secret: Option<&str>) -> Relay {
    let config = AppConfig {
        telegram_bot_token: "42:relay".to_string(),
        telegram_chat_id: "777".to_string(),
        webhook_secret: secret.map(ToString::to_string),
        telegram_api_base: Url::parse(api_base).unwrap(),
        telegram_parse_mode: None,
        disable_web_page_preview: false,
    };
    let client = TelegramClient::new(&config)
        .unwrap()
        .with_retry_policy(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
        });
    Relay::new(config.webhook_secret, client)
}

#[test]
fn test_build_relay_from_config() {
    let config = AppConfig::from_lookup(|key| match key {
        "TELEGRAM_BOT_TOKEN" => Some("42:relay".to_string()),
        "TELEGRAM_CHAT_ID" => Some("777".to_string()),
        "WEBHOOK_SECRET" => Some("abc".to_string()),
        _ => None,
    })
    .unwrap();

    let relay = build_relay(&config).unwrap();
    assert_eq!(relay.delivery().retry_policy(), RetryPolicy::default());
}

/// Counts ERROR-level events emitted while it is the default subscriber.
#[derive(Clone, Default)]
struct ErrorEvents(Arc<AtomicUsize>);

impl ErrorEvents {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: tracing::Subscriber> Layer<S> for ErrorEvents {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn event(payload: Value) -> LambdaEvent<Value> {
    LambdaEvent::new(payload, Context::default())
}

fn status(response: &Value) -> u64 {
    response["statusCode"].as_u64().unwrap()
}

async fn mount_ok(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_json_message_is_forwarded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_string("chat_id=777&text=hi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let relay = relay(&mock_server.uri(), None);
    let response = handler(
        Ok(&relay),
        event(json!({
            "headers": { "Content-Type": "application/json" },
            "body": "{\"message\":\"hi\"}",
            "isBase64Encoded": false
        })),
    )
    .await
    .unwrap();

    assert_eq!(status(&response), 200);
    assert_eq!(response["body"], "ok");
}

#[tokio::test]
async fn test_plain_text_with_token_line() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_string("chat_id=777&text=token%3A+abc%0ABuy+100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let relay = relay(&mock_server.uri(), Some("abc"));
    let response = handler(
        Ok(&relay),
        event(json!({
            "headers": { "content-type": "text/plain" },
            "body": "token: abc\nBuy 100"
        })),
    )
    .await
    .unwrap();

    assert_eq!(status(&response), 200);
}

#[tokio::test]
async fn test_header_token_with_base64_body() {
    let mock_server = MockServer::start().await;
    mount_ok(&mock_server, 1).await;

    let relay = relay(&mock_server.uri(), Some("s3cret"));
    let response = handler(
        Ok(&relay),
        event(json!({
            "headers": {
                "content-type": "application/json",
                "X-Webhook-Token": "s3cret"
            },
            // {"message":"hi"}
            "body": "eyJtZXNzYWdlIjoiaGkifQ==",
            "isBase64Encoded": true
        })),
    )
    .await
    .unwrap();

    assert_eq!(status(&response), 200);
}

#[tokio::test]
async fn test_wrong_token_is_401_without_delivery() {
    let mock_server = MockServer::start().await;
    mount_ok(&mock_server, 0).await;

    let relay = relay(&mock_server.uri(), Some("abc"));
    let response = handler(
        Ok(&relay),
        event(json!({
            "headers": { "content-type": "application/json" },
            "body": "{\"message\":\"hi\",\"token\":\"xyz\"}"
        })),
    )
    .await
    .unwrap();

    assert_eq!(status(&response), 401);
}

#[tokio::test]
async fn test_empty_message_is_400_without_delivery() {
    let mock_server = MockServer::start().await;
    mount_ok(&mock_server, 0).await;

    let relay = relay(&mock_server.uri(), None);
    let response = handler(
        Ok(&relay),
        event(json!({
            "headers": { "content-type": "application/json" },
            "body": "{\"message\":\"   \"}"
        })),
    )
    .await
    .unwrap();

    assert_eq!(status(&response), 400);
    assert_eq!(response["body"], "No message to forward");
}

#[tokio::test]
async fn test_missing_body_is_400() {
    let mock_server = MockServer::start().await;
    mount_ok(&mock_server, 0).await;

    let relay = relay(&mock_server.uri(), None);
    let response = handler(Ok(&relay), event(json!({ "headers": {} })))
        .await
        .unwrap();

    assert_eq!(status(&response), 400);
}

#[tokio::test]
async fn test_long_message_sends_three_chunks() {
    let mock_server = MockServer::start().await;
    mount_ok(&mock_server, 3).await;

    let relay = relay(&mock_server.uri(), None);
    let response = handler(
        Ok(&relay),
        event(json!({ "body": "x".repeat(9000) })),
    )
    .await
    .unwrap();

    assert_eq!(status(&response), 200);
}

#[tokio::test]
async fn test_delivery_failure_is_502() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let relay = relay(&mock_server.uri(), None);
    let response = handler(Ok(&relay), event(json!({ "body": "hello" })))
        .await
        .unwrap();

    assert_eq!(status(&response), 502);
    assert!(!response["body"].as_str().unwrap().contains("42:relay"));
}

#[tokio::test]
async fn test_delivery_failure_is_logged_once_as_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let errors = ErrorEvents::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(errors.clone()));

    let relay = relay(&mock_server.uri(), None);
    let response = handler(Ok(&relay), event(json!({ "body": "hello" })))
        .await
        .unwrap();

    assert_eq!(status(&response), 502);
    assert_eq!(errors.count(), 1);
}

#[tokio::test]
async fn test_missing_config_is_500_before_reading_request() {
    let err = RelayError::ConfigMissing("TELEGRAM_BOT_TOKEN".to_string());

    let response = handler::<TelegramClient>(
        Err(&err),
        event(json!({ "body": "hello" })),
    )
    .await
    .unwrap();

    assert_eq!(status(&response), 500);
    assert_eq!(
        response["body"],
        "Missing required configuration: TELEGRAM_BOT_TOKEN"
    );
}

#[test]
fn test_config_requires_token_and_chat_id() {
    let err = AppConfig::from_lookup(|key| match key {
        "TELEGRAM_CHAT_ID" => Some("777".to_string()),
        _ => None,
    })
    .unwrap_err();
    assert!(matches!(err, RelayError::ConfigMissing(ref k) if k == "TELEGRAM_BOT_TOKEN"));

    let err = AppConfig::from_lookup(|key| match key {
        "TELEGRAM_BOT_TOKEN" => Some("42:relay".to_string()),
        _ => None,
    })
    .unwrap_err();
    assert!(matches!(err, RelayError::ConfigMissing(ref k) if k == "TELEGRAM_CHAT_ID"));
}
