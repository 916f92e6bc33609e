//! Error Classifier
//!
//! Pure mapping from raw backend/gateway failures into the closed
//! [`FailureClass`] taxonomy. The match order is load-bearing: a 402 must
//! become `CredentialRequired`, never a generic decline, because the
//! recovery path differs (collect a credential vs. show a decline reason).
//! Nothing downstream of this module matches on raw code strings.

use notapay_gateway::{DeclineCode, GatewayError};

use crate::error::{ExecutionError, TokenizeError};

/// Backend domain rules that can reject an invoice emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessRule {
    CompanyNotConfigured,
    FiscalError,
    InvalidClient,
}

impl BusinessRule {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "COMPANY_NOT_CONFIGURED" => Some(Self::CompanyNotConfigured),
            "FISCAL_ERROR" => Some(Self::FiscalError),
            "INVALID_CLIENT" => Some(Self::InvalidClient),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompanyNotConfigured => "COMPANY_NOT_CONFIGURED",
            Self::FiscalError => "FISCAL_ERROR",
            Self::InvalidClient => "INVALID_CLIENT",
        }
    }
}

/// Closed failure taxonomy driving state transitions and user copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureClass {
    /// No reusable credential on file; collect one
    CredentialRequired,
    /// The issuer declined the card, with the sub-reason kept for messaging
    CredentialRejected(DeclineCode),
    /// The issuer demands step-up authentication before the charge completes
    StepUpRequired { client_secret: String },
    /// The backend rejected the action on domain grounds
    BusinessRuleViolation(BusinessRule),
    /// No response from the network layer; safe to retry
    Transient,
    Unknown,
}

const CREDENTIAL_REQUIRED_CODE: &str = "PAYMENT_METHOD_REQUIRED";
const STEP_UP_CODE: &str = "PAYMENT_REQUIRES_ACTION";

/// Classify an execution failure. First match wins.
pub fn classify_execution(err: &ExecutionError) -> FailureClass {
    match err {
        ExecutionError::Backend {
            status,
            code,
            message,
            client_secret,
        } => {
            let code = code.as_deref();

            // 1. Missing credential beats everything else
            if *status == 402 || code == Some(CREDENTIAL_REQUIRED_CODE) {
                return FailureClass::CredentialRequired;
            }

            // 2. Step-up demand, only when the challenge secret is present
            if code == Some(STEP_UP_CODE) {
                if let Some(secret) = client_secret {
                    return FailureClass::StepUpRequired {
                        client_secret: secret.clone(),
                    };
                }
            }

            // 3. Gateway declines relayed by the backend
            let decline = code.and_then(DeclineCode::from_code).or_else(|| {
                message.as_deref().and_then(DeclineCode::from_message)
            });
            if let Some(reason) = decline {
                return FailureClass::CredentialRejected(reason);
            }

            // 4. Domain rejections
            if let Some(rule) = code.and_then(BusinessRule::from_code) {
                return FailureClass::BusinessRuleViolation(rule);
            }

            FailureClass::Unknown
        }
        ExecutionError::StepUpFailed(gateway) => classify_gateway(gateway),
        // A repeated step-up demand is surfaced as retryable: a fresh
        // confirmation gesture runs the challenge again from scratch
        ExecutionError::StepUpRepeated => FailureClass::Transient,
        // 5. Network-layer failures, no response received
        ExecutionError::Transport(_) => FailureClass::Transient,
        // 6. Anything else
        ExecutionError::InvalidResponse(_) => FailureClass::Unknown,
    }
}

/// Classify a gateway failure
pub fn classify_gateway(err: &GatewayError) -> FailureClass {
    match err {
        GatewayError::Declined { code, .. } => FailureClass::CredentialRejected(*code),
        GatewayError::Timeout => FailureClass::Transient,
        GatewayError::Api(message) => match DeclineCode::from_message(message) {
            Some(reason) => FailureClass::CredentialRejected(reason),
            None => FailureClass::Unknown,
        },
    }
}

/// Classify a tokenization failure
pub fn classify_tokenize(err: &TokenizeError) -> FailureClass {
    match err {
        TokenizeError::Backend(e) => classify_execution(e),
        TokenizeError::Gateway(g) => classify_gateway(g),
    }
}
