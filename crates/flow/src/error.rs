//! Execution error types
//!
//! The Tokenizer and the Executor never leak raw transport or SDK errors
//! past their boundary; everything is wrapped here and interpreted only by
//! the classifier.

use notapay_gateway::GatewayError;
use thiserror::Error;

/// Failure of a billable action execution
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// The backend answered with an error envelope or a bare non-2xx status
    #[error("Backend rejected the action (status {status}, code {code:?})")]
    Backend {
        status: u16,
        code: Option<String>,
        message: Option<String>,
        /// Challenge secret, present when the backend demands step-up
        /// authentication
        client_secret: Option<String>,
    },

    /// The gateway could not complete the issuer's step-up challenge
    #[error("Step-up challenge failed: {0}")]
    StepUpFailed(GatewayError),

    /// The backend demanded a second step-up for the same attempt; never
    /// retried automatically
    #[error("Step-up authentication demanded again for the same attempt")]
    StepUpRepeated,

    /// Network-layer failure, no response from the backend
    #[error("Network failure: {0}")]
    Transport(String),

    /// The backend responded with something we could not decode
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ExecutionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExecutionError::InvalidResponse(err.to_string())
        } else {
            ExecutionError::Transport(err.to_string())
        }
    }
}

/// Failure of a credential tokenization attempt
#[derive(Debug, Clone, Error)]
pub enum TokenizeError {
    /// The backend could not mint a setup intent
    #[error("Setup intent request failed: {0}")]
    Backend(#[from] ExecutionError),

    /// The gateway rejected the card
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
