//! Alert Relay - forwards webhook alerts (e.g. trading alerts) to a Telegram chat.
//!
//! A single Lambda receives the webhook call, optionally checks a shared secret,
//! extracts the message text and posts it to the Telegram Bot API in chunks of at most
//! 4096 characters, retrying failed sends with exponential backoff.
//!
//! # Architecture
//!
//! The pipeline runs strictly in order:
//! 1. Decode the body (base64, JSON or plain text)
//! 2. Validate the webhook token against `WEBHOOK_SECRET`
//! 3. Extract the message
//! 4. Split it into Telegram-sized chunks
//! 5. Deliver each chunk, stopping at the first chunk that cannot be delivered
//!
//! # Example
//!
//! ```no_run
//! use alert_relay::api::handler::build_relay;
//! use alert_relay::core::config::AppConfig;
//! use alert_relay::core::models::{Headers, IncomingRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     alert_relay::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let relay = build_relay(&config)?;
//!
//!     let request = IncomingRequest {
//!         body: r#"{"message": "BTCUSD crossed 70k"}"#.to_string(),
//!         is_base64_encoded: false,
//!         headers: [("Content-Type", "application/json")].into_iter().collect::<Headers>(),
//!     };
//!     let chunks = relay.process(&request).await?;
//!     println!("Delivered {chunks} chunk(s)");
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod core;
pub mod errors;
pub mod telegram;

pub use errors::RelayError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. It should be called once at process start; later
/// calls leave the first subscriber in place.
///
/// # Example
///
/// ```
/// alert_relay::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .try_init();
}
