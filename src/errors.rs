use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Missing required configuration: {0}")]
    ConfigMissing(String),

    #[error("Failed to decode request body: {0}")]
    Decode(String),

    #[error("Unauthorized: webhook token missing or invalid")]
    Unauthorized,

    #[error("No message to forward")]
    EmptyMessage,

    #[error("Failed to deliver message: {0}")]
    DeliveryFailed(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl RelayError {
    /// HTTP status code the webhook caller receives for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::ConfigMissing(_) | RelayError::HttpClient(_) => 500,
            RelayError::Decode(_) | RelayError::EmptyMessage => 400,
            RelayError::Unauthorized => 401,
            RelayError::DeliveryFailed(_) => 502,
        }
    }
}

// The request URL embeds the bot token, so it is stripped before the error is rendered.
impl From<reqwest::Error> for RelayError {
    fn from(error: reqwest::Error) -> Self {
        RelayError::DeliveryFailed(error.without_url().to_string())
    }
}
