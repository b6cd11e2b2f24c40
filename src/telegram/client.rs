//! Telegram Bot API client
//!
//! Sends text to a single chat through `sendMessage`, retrying failed attempts with
//! exponential backoff.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_retry::Retry;
use tracing::{debug, warn};
use url::Url;

use crate::core::config::{AppConfig, REQUEST_TIMEOUT, RetryPolicy};
use crate::core::delivery::ChatDelivery;
use crate::errors::RelayError;

/// Body returned by every Bot API method.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    pub ok: bool,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

impl SendMessageResponse {
    fn describe(&self) -> String {
        match (self.error_code, &self.description) {
            (Some(code), Some(desc)) => format!("{code} {desc}"),
            (None, Some(desc)) => desc.clone(),
            (Some(code), None) => code.to_string(),
            (None, None) => "no description".to_string(),
        }
    }
}

pub struct TelegramClient {
    http: Client,
    timeout: Duration,
    endpoint: Url,
    chat_id: String,
    parse_mode: Option<String>,
    disable_web_page_preview: bool,
    retry: RetryPolicy,
}

impl TelegramClient {
    /// # Errors
    ///
    /// Returns `RelayError::ConfigMissing` if the API base cannot carry a path, or
    /// `RelayError::HttpClient` if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, RelayError> {
        Ok(Self {
            http: build_http_client(REQUEST_TIMEOUT)?,
            timeout: REQUEST_TIMEOUT,
            endpoint: send_message_url(&config.telegram_api_base, &config.telegram_bot_token)?,
            chat_id: config.telegram_chat_id.clone(),
            parse_mode: config.telegram_parse_mode.clone(),
            disable_web_page_preview: config.disable_web_page_preview,
            retry: RetryPolicy::default(),
        })
    }

    /// Replaces the per-attempt timeout. A timed-out attempt is retried like any other
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::HttpClient` if the HTTP client cannot be rebuilt.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, RelayError> {
        self.http = build_http_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T, RelayError>
    where
        F: FnMut(usize) -> Fut + Send,
        Fut: Future<Output = Result<T, RelayError>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        Retry::spawn(self.retry.backoff(), || {
            attempt += 1;
            operation(attempt)
        })
        .await
    }

    /// Sends `text` to the configured chat, retrying per the client's [`RetryPolicy`].
    ///
    /// # Errors
    ///
    /// Returns the last attempt's `RelayError::DeliveryFailed` once all attempts fail.
    pub async fn send_message(&self, text: &str) -> Result<(), RelayError> {
        let max_attempts = self.retry.max_attempts;
        self.with_retry(|attempt| async move {
            self.send_message_once(text).await.map_err(|e| {
                warn!(attempt, max_attempts, error = %e, "Telegram sendMessage attempt failed");
                e
            })
        })
        .await
    }

    async fn send_message_once(&self, text: &str) -> Result<(), RelayError> {
        let mut form: Vec<(&str, &str)> = vec![("chat_id", self.chat_id.as_str()), ("text", text)];
        if let Some(mode) = &self.parse_mode {
            form.push(("parse_mode", mode.as_str()));
        }
        if self.disable_web_page_preview {
            form.push(("disable_web_page_preview", "true"));
        }

        let resp = self
            .http
            .post(self.endpoint.clone())
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        let body_text = resp.text().await?;
        let parsed = serde_json::from_str::<SendMessageResponse>(&body_text).ok();

        if !status.is_success() {
            let detail = parsed
                .as_ref()
                .map_or_else(|| "unreadable response".to_string(), SendMessageResponse::describe);
            return Err(RelayError::DeliveryFailed(format!(
                "Telegram returned HTTP {}: {}",
                status, detail
            )));
        }

        match parsed {
            Some(r) if r.ok => {
                debug!(chars = text.chars().count(), "Telegram accepted message");
                Ok(())
            }
            Some(r) => Err(RelayError::DeliveryFailed(format!(
                "Telegram rejected message: {}",
                r.describe()
            ))),
            None => Err(RelayError::DeliveryFailed(
                "Telegram response was not valid JSON".to_string(),
            )),
        }
    }
}

#[async_trait]
impl ChatDelivery for TelegramClient {
    async fn send_text(&self, text: &str) -> Result<(), RelayError> {
        self.send_message(text).await
    }
}

fn build_http_client(timeout: Duration) -> Result<Client, RelayError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RelayError::HttpClient(e.without_url().to_string()))
}

/// `{api_base}/bot{token}/sendMessage`, appended as path segments so the token's `:` is
/// never read as a URL scheme.
fn send_message_url(api_base: &Url, token: &str) -> Result<Url, RelayError> {
    let mut url = api_base.clone();
    url.path_segments_mut()
        .map_err(|()| {
            RelayError::ConfigMissing("TELEGRAM_API_BASE cannot be used as a base URL".to_string())
        })?
        .pop_if_empty()
        .push(&format!("bot{token}"))
        .push("sendMessage");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url_keeps_token_in_path() {
        let base = Url::parse("https://api.telegram.org").unwrap();
        let url = send_message_url(&base, "123456:ABC-def").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.telegram.org/bot123456:ABC-def/sendMessage"
        );
    }

    #[test]
    fn test_send_message_url_preserves_base_path() {
        let base = Url::parse("http://localhost:8081/proxy/").unwrap();
        let url = send_message_url(&base, "1:x").unwrap();
        assert_eq!(url.path(), "/proxy/bot1:x/sendMessage");
    }

    #[test]
    fn test_response_error_parsing() {
        let json_str =
            r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#;
        let resp: SendMessageResponse = serde_json::from_str(json_str).unwrap();

        assert!(!resp.ok);
        assert_eq!(resp.describe(), "400 Bad Request: chat not found");
    }

    #[test]
    fn test_response_success_parsing_ignores_result() {
        let json_str = r#"{"ok": true, "result": {"message_id": 7}}"#;
        let resp: SendMessageResponse = serde_json::from_str(json_str).unwrap();

        assert!(resp.ok);
        assert!(resp.description.is_none());
    }
}
