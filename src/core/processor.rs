use tracing::{error, info};

use crate::api::parsing::{decode_body, extract_message};
use crate::api::secret::validate_secret;
use crate::core::delivery::ChatDelivery;
use crate::core::models::IncomingRequest;
use crate::errors::RelayError;
use crate::telegram::chunking::{TELEGRAM_MAX_MESSAGE_LEN, chunk_message};

/// Runs one webhook request through decode, secret check, extraction, chunking and
/// in-order delivery.
pub struct RequestProcessor<D> {
    secret: Option<String>,
    max_chunk_len: usize,
    delivery: D,
}

impl<D: ChatDelivery> RequestProcessor<D> {
    #[must_use]
    pub fn new(secret: Option<String>, delivery: D) -> Self {
        Self {
            secret,
            max_chunk_len: TELEGRAM_MAX_MESSAGE_LEN,
            delivery,
        }
    }

    #[must_use]
    pub fn with_max_chunk_len(mut self, max_chunk_len: usize) -> Self {
        self.max_chunk_len = max_chunk_len;
        self
    }

    #[must_use]
    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    /// Returns the number of chunks delivered.
    ///
    /// # Errors
    ///
    /// Returns the first stage error. A delivery failure stops the remaining chunks.
    pub async fn process(&self, request: &IncomingRequest) -> Result<usize, RelayError> {
        let body = decode_body(request)?;
        validate_secret(self.secret.as_deref(), &body, &request.headers)?;

        let message = extract_message(&body)?;
        let chunks = chunk_message(&message, self.max_chunk_len);
        info!(
            structured = body.is_structured(),
            chars = message.chars().count(),
            chunk_count = chunks.len(),
            "Forwarding message"
        );

        for (index, chunk) in chunks.iter().enumerate() {
            if let Err(e) = self.delivery.send_text(chunk).await {
                error!(
                    chunk = index + 1,
                    chunk_count = chunks.len(),
                    "Giving up on message delivery: {}",
                    e
                );
                return Err(e);
            }
        }

        Ok(chunks.len())
    }
}
