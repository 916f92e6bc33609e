//! NotaPay Payment-Confirmation Flow
//!
//! Orchestrates the billable-action confirmation surface: establish a
//! reusable payment credential (collecting one through the gateway when
//! missing), execute the priced action against the fiscal backend, resolve
//! a mid-flow step-up authentication challenge exactly once, and classify
//! every failure into a recoverable, user-facing state.
//!
//! ## Components
//!
//! - [`classify`] — pure classifier from raw failures into [`FailureClass`]
//! - [`probe`] — credential probe over the subscription snapshot
//! - [`tokenize`] — credential creation through the gateway
//! - [`execute`] — priced-action execution with bounded step-up retry
//! - [`orchestrator`] — the flow state machine owning UI-visible state

pub mod backend;
pub mod classify;
pub mod error;
pub mod execute;
pub mod messages;
pub mod orchestrator;
pub mod probe;
pub mod tokenize;

pub use backend::{BackendApi, BackendConfig, HttpBackend, SubscriptionSource};
pub use classify::{classify_execution, classify_gateway, classify_tokenize, BusinessRule, FailureClass};
pub use error::{ExecutionError, TokenizeError};
pub use execute::Executor;
pub use messages::{user_message, RecoveryAction, UserMessage};
pub use orchestrator::{
    ChargeAttempt, CollectError, ConfirmationFlow, FlowCloseHandle, FlowObserver, FlowState,
};
pub use probe::CredentialProber;
pub use tokenize::Tokenizer;
