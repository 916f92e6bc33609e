//! NotaPay Shared Types
//!
//! Types shared between the payment-confirmation flow and the gateway crate.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
