//! Tokenizer
//!
//! Wraps the gateway's two credential-creation flows. Raw card data only
//! ever travels to the gateway; the backend contributes the setup intent
//! and receives an opaque credential reference out of band.

use std::time::Duration;

use notapay_gateway::{CardDetails, GatewayError, PaymentGateway, PaymentMethodToken};

use crate::backend::BackendApi;
use crate::error::TokenizeError;

/// Timeout for gateway confirmation calls (60 seconds).
///
/// Expiry classifies as transient; see DESIGN notes.
pub(crate) const GATEWAY_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// Credential tokenization over a backend + gateway pair
pub struct Tokenizer<B, G> {
    backend: B,
    gateway: G,
}

impl<B: BackendApi, G: PaymentGateway> Tokenizer<B, G> {
    pub fn new(backend: B, gateway: G) -> Self {
        Self { backend, gateway }
    }

    /// Attach a reusable credential: mint a setup intent with the backend,
    /// then confirm it with the gateway using the card input. On success the
    /// backend holds a reusable credential for future charges.
    pub async fn attach_reusable_credential(
        &self,
        card: &CardDetails,
    ) -> Result<(), TokenizeError> {
        let client_secret = self.backend.create_setup_intent().await?;

        let confirm = self.gateway.confirm_card_setup(&client_secret, card);
        match tokio::time::timeout(GATEWAY_CONFIRM_TIMEOUT, confirm).await {
            Ok(Ok(())) => {
                tracing::info!(last4 = card.last4(), "Reusable credential attached");
                Ok(())
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "Credential attach rejected by gateway");
                Err(TokenizeError::Gateway(err))
            }
            Err(_) => Err(TokenizeError::Gateway(GatewayError::Timeout)),
        }
    }

    /// Create a one-shot credential, for charges that must not store the
    /// card. Returns the opaque payment-method token to pass along to the
    /// backend.
    pub async fn create_one_shot_credential(
        &self,
        card: &CardDetails,
    ) -> Result<PaymentMethodToken, TokenizeError> {
        let create = self.gateway.create_payment_method(card);
        match tokio::time::timeout(GATEWAY_CONFIRM_TIMEOUT, create).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(TokenizeError::Gateway(GatewayError::Timeout)),
        }
    }
}
