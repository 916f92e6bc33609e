//! Gateway error types and issuer decline codes

use thiserror::Error;

/// Issuer decline reasons the product distinguishes for messaging.
///
/// Anything the issuer reports outside this set stays a generic decline;
/// downstream code never matches on raw code strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineCode {
    CardDeclined,
    ExpiredCard,
    IncorrectCvc,
    IncorrectNumber,
    InsufficientFunds,
    ProcessingError,
}

impl DeclineCode {
    /// Map a structured gateway decline code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "card_declined" | "generic_decline" => Some(Self::CardDeclined),
            "expired_card" => Some(Self::ExpiredCard),
            "incorrect_cvc" | "invalid_cvc" => Some(Self::IncorrectCvc),
            "incorrect_number" | "invalid_number" => Some(Self::IncorrectNumber),
            "insufficient_funds" => Some(Self::InsufficientFunds),
            "processing_error" => Some(Self::ProcessingError),
            _ => None,
        }
    }

    /// Fall back to a substring match on the issuer message.
    ///
    /// Some acquirers only return free-text; this keeps the specific
    /// sub-reason instead of collapsing everything to a generic decline.
    pub fn from_message(message: &str) -> Option<Self> {
        let msg = message.to_lowercase();
        if msg.contains("insufficient funds") {
            Some(Self::InsufficientFunds)
        } else if msg.contains("expired") {
            Some(Self::ExpiredCard)
        } else if msg.contains("security code") || msg.contains("cvc") {
            Some(Self::IncorrectCvc)
        } else if msg.contains("card number") {
            Some(Self::IncorrectNumber)
        } else if msg.contains("declined") {
            Some(Self::CardDeclined)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CardDeclined => "card_declined",
            Self::ExpiredCard => "expired_card",
            Self::IncorrectCvc => "incorrect_cvc",
            Self::IncorrectNumber => "incorrect_number",
            Self::InsufficientFunds => "insufficient_funds",
            Self::ProcessingError => "processing_error",
        }
    }
}

/// Errors returned by the payment gateway boundary
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Card declined ({}): {message}", code.as_str())]
    Declined { code: DeclineCode, message: String },

    #[error("Gateway API error: {0}")]
    Api(String),

    #[error("Gateway did not respond in time")]
    Timeout,
}

impl GatewayError {
    /// Build from a raw gateway code/message pair, keeping the decline
    /// sub-reason when one can be recognized
    pub fn from_raw(code: Option<&str>, message: &str) -> Self {
        let decline = code
            .and_then(DeclineCode::from_code)
            .or_else(|| DeclineCode::from_message(message));

        match decline {
            Some(code) => GatewayError::Declined {
                code,
                message: message.to_string(),
            },
            None => GatewayError::Api(message.to_string()),
        }
    }

    /// The decline sub-reason, if this error is a recognized decline
    pub fn decline_code(&self) -> Option<DeclineCode> {
        match self {
            GatewayError::Declined { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<stripe::StripeError> for GatewayError {
    fn from(err: stripe::StripeError) -> Self {
        match &err {
            stripe::StripeError::Stripe(req) => {
                // Prefer the issuer decline code; fall back to the API error code
                let code = req
                    .decline_code
                    .clone()
                    .or_else(|| req.code.as_ref().map(|c| c.to_string()));
                let message = req.message.clone().unwrap_or_else(|| err.to_string());
                GatewayError::from_raw(code.as_deref(), &message)
            }
            _ => GatewayError::Api(err.to_string()),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decline_code_from_code() {
        assert_eq!(
            DeclineCode::from_code("insufficient_funds"),
            Some(DeclineCode::InsufficientFunds)
        );
        assert_eq!(
            DeclineCode::from_code("expired_card"),
            Some(DeclineCode::ExpiredCard)
        );
        assert_eq!(DeclineCode::from_code("rate_limit"), None);
    }

    #[test]
    fn test_decline_code_from_message_substring() {
        assert_eq!(
            DeclineCode::from_message("Your card has insufficient funds."),
            Some(DeclineCode::InsufficientFunds)
        );
        assert_eq!(
            DeclineCode::from_message("The card's security code is incorrect."),
            Some(DeclineCode::IncorrectCvc)
        );
        assert_eq!(DeclineCode::from_message("Something odd happened"), None);
    }

    #[test]
    fn test_from_raw_prefers_structured_code() {
        let err = GatewayError::from_raw(Some("incorrect_cvc"), "Your card was declined.");
        assert_eq!(err.decline_code(), Some(DeclineCode::IncorrectCvc));
    }

    #[test]
    fn test_from_raw_without_recognized_code_is_api_error() {
        let err = GatewayError::from_raw(Some("api_key_expired"), "Invalid API key");
        assert!(matches!(err, GatewayError::Api(_)));
        assert_eq!(err.decline_code(), None);
    }
}
