use async_trait::async_trait;

use crate::errors::RelayError;

/// Destination for forwarded text. Implementations own their retry behaviour; an `Err`
/// means the chunk is given up on and the remaining chunks must not be sent.
#[async_trait]
pub trait ChatDelivery: Send + Sync {
    /// # Errors
    ///
    /// Returns `RelayError::DeliveryFailed` once the chunk cannot be delivered.
    async fn send_text(&self, text: &str) -> Result<(), RelayError>;
}
