//! Payment gateway contract
//!
//! The confirmation flow talks to the gateway exclusively through this trait
//! so tests can substitute a fake and never touch the real SDK.

use crate::card::CardDetails;
use crate::error::GatewayResult;

/// Opaque reusable token minted by the gateway for a one-shot credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethodToken(pub String);

/// Operations the confirmation flow needs from the payment gateway.
///
/// `client_secret` values come from the fiscal backend (setup intents) or
/// from a step-up challenge signal; the gateway resolves them to the
/// underlying intent.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Send + Sync {
    /// Confirm a setup intent with the given card input, attaching a
    /// reusable credential to the customer on success
    async fn confirm_card_setup(
        &self,
        client_secret: &str,
        card: &CardDetails,
    ) -> GatewayResult<()>;

    /// Create a one-shot payment method from the card input, without
    /// storing it for reuse
    async fn create_payment_method(&self, card: &CardDetails)
        -> GatewayResult<PaymentMethodToken>;

    /// Run the issuer's step-up (3-D Secure style) challenge for a payment
    /// that the backend reported as requiring action
    async fn confirm_card_payment(&self, client_secret: &str) -> GatewayResult<()>;
}

impl<T: PaymentGateway> PaymentGateway for &T {
    async fn confirm_card_setup(
        &self,
        client_secret: &str,
        card: &CardDetails,
    ) -> GatewayResult<()> {
        (**self).confirm_card_setup(client_secret, card).await
    }

    async fn create_payment_method(
        &self,
        card: &CardDetails,
    ) -> GatewayResult<PaymentMethodToken> {
        (**self).create_payment_method(card).await
    }

    async fn confirm_card_payment(&self, client_secret: &str) -> GatewayResult<()> {
        (**self).confirm_card_payment(client_secret).await
    }
}
