//! Common types used across NotaPay

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Company ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub Uuid);

impl CompanyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CompanyId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CompanyId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Billable request & receipt
// =============================================================================

/// User-authored payload for a priced action (emitting a fiscal invoice).
///
/// Immutable once the confirmation flow opens: the flow consumes it
/// read-only and every retry re-sends this exact payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillableRequest {
    /// Recipient (tomador) legal name
    pub client_name: String,
    /// Recipient tax document (CPF/CNPJ), digits only
    pub client_document: String,
    /// Service description as it appears on the invoice
    pub description: String,
    /// Amount in centavos
    pub amount_cents: i64,
    /// Service tax (ISS) rate in basis points
    pub tax_rate_bps: u32,
    /// IBGE municipality code where the service was rendered
    pub municipality_code: String,
    pub company_id: CompanyId,
}

/// Invoice lifecycle status as reported by the fiscal backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Authorized,
    Processing,
    Rejected,
    Cancelled,
}

/// Result of a successfully executed billable action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Backend identifier of the emitted invoice
    pub invoice_id: String,
    pub status: InvoiceStatus,
    /// Municipality verification code, present once the invoice is authorized
    pub verification_code: Option<String>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub issued_at: Option<OffsetDateTime>,
}

// =============================================================================
// Subscription snapshot
// =============================================================================

/// Snapshot of the company's subscription as returned by
/// `GET subscription/current`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSnapshot {
    /// Whether the backend believes a reusable payment credential is on file
    pub has_reusable_credential: bool,
    pub plan_id: String,
    pub status: String,
}

/// Whether a reusable payment credential is on file for the company.
///
/// Derived from a subscription snapshot when the flow opens; never
/// persisted client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentCredentialState {
    /// Not yet probed
    #[default]
    Unknown,
    Absent,
    Present,
}

impl PaymentCredentialState {
    pub fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

// =============================================================================
// Money formatting
// =============================================================================

/// Format centavos as Brazilian currency, e.g. `R$ 1.234,56`
pub fn format_brl(amount_cents: i64) -> String {
    let negative = amount_cents < 0;
    let abs = amount_cents.unsigned_abs();
    let reais = abs / 100;
    let cents = abs % 100;

    // Thousands separated with '.', decimal with ','
    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, cents)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_brl_small() {
        assert_eq!(format_brl(0), "R$ 0,00");
        assert_eq!(format_brl(5), "R$ 0,05");
        assert_eq!(format_brl(1990), "R$ 19,90");
    }

    #[test]
    fn test_format_brl_thousands() {
        assert_eq!(format_brl(123_456), "R$ 1.234,56");
        assert_eq!(format_brl(100_000_000), "R$ 1.000.000,00");
    }

    #[test]
    fn test_format_brl_negative() {
        assert_eq!(format_brl(-250), "-R$ 2,50");
    }

    #[test]
    fn test_subscription_snapshot_wire_shape() {
        let json = r#"{"hasReusableCredential":true,"planId":"pay_per_use","status":"active"}"#;
        let snap: SubscriptionSnapshot = serde_json::from_str(json).unwrap();
        assert!(snap.has_reusable_credential);
        assert_eq!(snap.plan_id, "pay_per_use");
    }
}
