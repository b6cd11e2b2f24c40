use std::env;
use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;
use url::Url;

use crate::errors::RelayError;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Per-attempt timeout for outbound Telegram calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub webhook_secret: Option<String>,
    pub telegram_api_base: Url,
    pub telegram_parse_mode: Option<String>,
    pub disable_web_page_preview: bool,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `RelayError::ConfigMissing` naming the first required variable that is
    /// unset or blank, or the API base URL if it does not parse.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required =
            |key: &str| get(key).ok_or_else(|| RelayError::ConfigMissing(key.to_string()));

        let api_base = get("TELEGRAM_API_BASE")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string());
        let telegram_api_base = Url::parse(&api_base).map_err(|e| {
            RelayError::ConfigMissing(format!("TELEGRAM_API_BASE is not a valid URL: {}", e))
        })?;

        Ok(Self {
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: required("TELEGRAM_CHAT_ID")?,
            webhook_secret: get("WEBHOOK_SECRET"),
            telegram_api_base,
            telegram_parse_mode: get("TELEGRAM_PARSE_MODE"),
            disable_web_page_preview: get("TELEGRAM_DISABLE_WEB_PAGE_PREVIEW")
                .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
        })
    }
}

/// Bounded retry with exponential backoff for a single chunk delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delays slept between attempts: `base, 2*base, 4*base, ...`, one fewer than
    /// `max_attempts` so nothing is slept after the final attempt. The base is taken in
    /// whole milliseconds and rounded down to an even number.
    #[must_use]
    pub fn backoff(&self) -> std::iter::Take<ExponentialBackoff> {
        let half_base_ms = u64::try_from(self.base_delay.as_millis() / 2).unwrap_or(u64::MAX);
        ExponentialBackoff::from_millis(2)
            .factor(half_base_ms)
            .take(self.max_attempts.saturating_sub(1))
    }
}
