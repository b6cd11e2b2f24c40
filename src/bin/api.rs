use alert_relay::api::handler::{build_relay, handler};
use alert_relay::core::config::AppConfig;
use lambda_runtime::{Error, run, service_fn};
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    alert_relay::setup_logging();

    // Configuration is read once; a broken setup still starts so callers get a 500.
    let relay = AppConfig::from_env().and_then(|config| build_relay(&config));
    if let Err(e) = &relay {
        error!("Relay is not configured: {}", e);
    }
    let relay = relay.as_ref();

    run(service_fn(move |event| async move { handler(relay, event).await })).await
}
