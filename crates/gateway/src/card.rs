//! Card input and widget-level validation
//!
//! Validation runs locally, before any submission, and blocks the submit
//! affordance until cleared. Invalid input never reaches the network.

use thiserror::Error;
use time::OffsetDateTime;

/// Raw card input collected from the card widget.
///
/// Lives only inside the credential-collection step and is dropped when the
/// flow leaves that step.
#[derive(Clone)]
pub struct CardDetails {
    pub number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: String,
    pub holder_name: String,
}

// Card numbers must never end up in logs
impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &format_args!("****{}", self.last4()))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .finish_non_exhaustive()
    }
}

/// Widget-level validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CardInputError {
    #[error("Card number is invalid")]
    InvalidNumber,

    #[error("Expiration date is invalid")]
    InvalidExpiry,

    #[error("Card is expired")]
    Expired,

    #[error("Security code is invalid")]
    InvalidCvc,
}

impl CardInputError {
    /// Inline copy shown next to the offending field
    pub fn user_message(self) -> &'static str {
        match self {
            Self::InvalidNumber => "Número do cartão inválido",
            Self::InvalidExpiry => "Data de validade inválida",
            Self::Expired => "Cartão vencido",
            Self::InvalidCvc => "Código de segurança inválido",
        }
    }
}

impl CardDetails {
    /// Last four digits, for display and debug output
    pub fn last4(&self) -> &str {
        let digits = self.number.trim();
        let start = digits.len().saturating_sub(4);
        &digits[start..]
    }

    /// Validate the input as the card widget would, without any I/O
    pub fn validate(&self) -> Result<(), CardInputError> {
        self.validate_at(OffsetDateTime::now_utc())
    }

    fn validate_at(&self, now: OffsetDateTime) -> Result<(), CardInputError> {
        let digits: Vec<u8> = self
            .number
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_digit(10).map(|d| d as u8).ok_or(CardInputError::InvalidNumber))
            .collect::<Result<_, _>>()?;

        if !(13..=19).contains(&digits.len()) || !luhn_valid(&digits) {
            return Err(CardInputError::InvalidNumber);
        }

        if !(1..=12).contains(&self.exp_month) {
            return Err(CardInputError::InvalidExpiry);
        }

        // A card expires at the end of its printed month
        let (year, month) = (now.year() as u16, now.month() as u8);
        if self.exp_year < year || (self.exp_year == year && self.exp_month < month) {
            return Err(CardInputError::Expired);
        }

        if !(3..=4).contains(&self.cvc.len()) || !self.cvc.chars().all(|c| c.is_ascii_digit()) {
            return Err(CardInputError::InvalidCvc);
        }

        Ok(())
    }
}

/// Standard Luhn checksum over the card digits
fn luhn_valid(digits: &[u8]) -> bool {
    let mut sum = 0u32;
    for (i, &d) in digits.iter().rev().enumerate() {
        let mut d = u32::from(d);
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn valid_card() -> CardDetails {
        CardDetails {
            // Stripe test Visa, passes Luhn
            number: "4242 4242 4242 4242".to_string(),
            exp_month: 12,
            exp_year: 2031,
            cvc: "123".to_string(),
            holder_name: "MARIA SILVA".to_string(),
        }
    }

    const NOW: OffsetDateTime = datetime!(2026-08-01 12:00 UTC);

    #[test]
    fn test_valid_card_passes() {
        assert_eq!(valid_card().validate_at(NOW), Ok(()));
    }

    #[test]
    fn test_luhn_failure_is_invalid_number() {
        let mut card = valid_card();
        card.number = "4242424242424241".to_string();
        assert_eq!(card.validate_at(NOW), Err(CardInputError::InvalidNumber));
    }

    #[test]
    fn test_non_digit_number_is_invalid() {
        let mut card = valid_card();
        card.number = "4242-4242-4242-4242".to_string();
        assert_eq!(card.validate_at(NOW), Err(CardInputError::InvalidNumber));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let mut card = valid_card();
        card.exp_month = 7;
        card.exp_year = 2026;
        assert_eq!(card.validate_at(NOW), Err(CardInputError::Expired));
    }

    #[test]
    fn test_current_month_still_valid() {
        let mut card = valid_card();
        card.exp_month = 8;
        card.exp_year = 2026;
        assert_eq!(card.validate_at(NOW), Ok(()));
    }

    #[test]
    fn test_bad_cvc() {
        let mut card = valid_card();
        card.cvc = "12".to_string();
        assert_eq!(card.validate_at(NOW), Err(CardInputError::InvalidCvc));
    }

    #[test]
    fn test_debug_masks_number() {
        let rendered = format!("{:?}", valid_card());
        assert!(!rendered.contains("4242 4242"));
        assert!(rendered.contains("****4242"));
    }
}
