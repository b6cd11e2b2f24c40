//! Lambda handler for the webhook endpoint.
//!
//! Turns the proxy event into an [`IncomingRequest`], runs it through the
//! [`RequestProcessor`] and maps the outcome to a status code and text body.

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, warn};

use super::helpers;
use crate::core::config::AppConfig;
use crate::core::delivery::ChatDelivery;
use crate::core::models::IncomingRequest;
use crate::core::processor::RequestProcessor;
use crate::errors::RelayError;
use crate::telegram::TelegramClient;

pub use self::function_handler as handler;

/// The production pipeline: a processor delivering through the Telegram Bot API.
pub type Relay = RequestProcessor<TelegramClient>;

/// # Errors
///
/// Returns `RelayError::HttpClient` if the HTTP client for Telegram cannot be built.
pub fn build_relay(config: &AppConfig) -> Result<Relay, RelayError> {
    let client = TelegramClient::new(config)?;
    Ok(RequestProcessor::new(config.webhook_secret.clone(), client))
}

/// Lambda handler for the webhook entrypoint.
///
/// `processor` is the result of start-up configuration; when it is an error every
/// request is answered with a 500 without looking at the event.
///
/// # Errors
///
/// Never returns an error: every outcome is mapped to a proxy response.
#[tracing::instrument(level = "info", skip_all, fields(request_id = %event.context.request_id))]
pub async fn function_handler<D: ChatDelivery>(
    processor: Result<&RequestProcessor<D>, &RelayError>,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    let processor = match processor {
        Ok(p) => p,
        Err(e) => {
            error!("Config error: {}", e);
            return Ok(helpers::err_response(e));
        }
    };

    let request = IncomingRequest::from_event(&event.payload);
    info!(
        body_len = request.body.len(),
        base64 = request.is_base64_encoded,
        content_type = request.content_type().unwrap_or_default(),
        "Webhook request received"
    );

    match processor.process(&request).await {
        Ok(chunk_count) => {
            info!(chunk_count, "Webhook message forwarded");
            Ok(helpers::ok_response())
        }
        Err(e) => {
            // Delivery failures are already logged with their chunk position.
            if e.status_code() < 500 {
                warn!("Webhook request rejected: {}", e);
            }
            Ok(helpers::err_response(&e))
        }
    }
}
