//! NotaPay Payment Gateway Boundary
//!
//! The only place raw card data is handled. Card details go straight to the
//! gateway SDK; the fiscal backend only ever sees opaque tokens and client
//! secrets.

pub mod card;
pub mod client;
pub mod error;
pub mod stripe_gateway;

pub use card::{CardDetails, CardInputError};
pub use client::{PaymentGateway, PaymentMethodToken};
pub use error::{DeclineCode, GatewayError, GatewayResult};
pub use stripe_gateway::{StripeGateway, StripeGatewayConfig};
