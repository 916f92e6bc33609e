//! Stripe-backed payment gateway

use serde::Serialize;
use stripe::{
    CardDetailsParams, Client, CreatePaymentMethod, CreatePaymentMethodCardUnion, PaymentIntent,
    PaymentIntentStatus, PaymentMethod, PaymentMethodTypeFilter, SetupIntent, SetupIntentStatus,
};

use notapay_shared::ConfigError;

use crate::card::CardDetails;
use crate::client::{PaymentGateway, PaymentMethodToken};
use crate::error::{GatewayError, GatewayResult};

/// Configuration for the Stripe gateway
#[derive(Debug, Clone)]
pub struct StripeGatewayConfig {
    /// Stripe secret API key
    pub secret_key: String,
}

impl StripeGatewayConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret_key: ConfigError::require("STRIPE_SECRET_KEY")?,
        })
    }
}

/// Payment gateway backed by the Stripe API
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    pub fn new(config: StripeGatewayConfig) -> Self {
        Self {
            client: Client::new(&config.secret_key),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(StripeGatewayConfig::from_env()?))
    }

    /// Tokenize card details into a Stripe payment method
    async fn tokenize_card(&self, card: &CardDetails) -> GatewayResult<PaymentMethod> {
        let method = PaymentMethod::create(
            &self.client,
            CreatePaymentMethod {
                type_: Some(PaymentMethodTypeFilter::Card),
                card: Some(CreatePaymentMethodCardUnion::CardDetailsParams(
                    CardDetailsParams {
                        number: card.number.chars().filter(|c| !c.is_whitespace()).collect(),
                        exp_month: i32::from(card.exp_month),
                        exp_year: i32::from(card.exp_year),
                        cvc: Some(card.cvc.clone()),
                    },
                )),
                ..Default::default()
            },
        )
        .await?;

        tracing::debug!(payment_method = %method.id, "Tokenized card with gateway");
        Ok(method)
    }
}

#[derive(Serialize)]
struct ConfirmIntentForm<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method: Option<&'a str>,
}

/// Recover the intent id from a client secret
/// (`seti_123_secret_456` → `seti_123`)
fn intent_id_from_secret(client_secret: &str) -> GatewayResult<&str> {
    client_secret
        .split_once("_secret")
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GatewayError::Api(format!("Malformed client secret: {}", client_secret)))
}

impl PaymentGateway for StripeGateway {
    async fn confirm_card_setup(
        &self,
        client_secret: &str,
        card: &CardDetails,
    ) -> GatewayResult<()> {
        let method = self.tokenize_card(card).await?;
        let intent_id = intent_id_from_secret(client_secret)?;

        // Intent confirmation goes through the raw form API
        let intent: SetupIntent = self
            .client
            .post_form(
                &format!("/setup_intents/{}/confirm", intent_id),
                ConfirmIntentForm {
                    payment_method: Some(method.id.as_str()),
                },
            )
            .await?;

        match intent.status {
            SetupIntentStatus::Succeeded => {
                tracing::info!(setup_intent = %intent.id, "Reusable credential attached");
                Ok(())
            }
            status => Err(GatewayError::Api(format!(
                "Setup intent not completed (status: {:?})",
                status
            ))),
        }
    }

    async fn create_payment_method(
        &self,
        card: &CardDetails,
    ) -> GatewayResult<PaymentMethodToken> {
        let method = self.tokenize_card(card).await?;
        Ok(PaymentMethodToken(method.id.to_string()))
    }

    async fn confirm_card_payment(&self, client_secret: &str) -> GatewayResult<()> {
        let intent_id = intent_id_from_secret(client_secret)?;

        let intent: PaymentIntent = self
            .client
            .post_form(
                &format!("/payment_intents/{}/confirm", intent_id),
                ConfirmIntentForm {
                    payment_method: None,
                },
            )
            .await?;

        match intent.status {
            PaymentIntentStatus::Succeeded | PaymentIntentStatus::Processing => {
                tracing::info!(payment_intent = %intent.id, "Step-up challenge confirmed");
                Ok(())
            }
            status => Err(GatewayError::Api(format!(
                "Payment intent not completed (status: {:?})",
                status
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_id_from_secret() {
        assert_eq!(
            intent_id_from_secret("seti_1AbC_secret_xYz").unwrap(),
            "seti_1AbC"
        );
        assert_eq!(
            intent_id_from_secret("pi_3Qf9_secret_k2m").unwrap(),
            "pi_3Qf9"
        );
    }

    #[test]
    fn test_malformed_client_secret() {
        assert!(intent_id_from_secret("not-a-secret").is_err());
        assert!(intent_id_from_secret("_secret_only").is_err());
    }
}
