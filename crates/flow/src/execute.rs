//! Billable Action Executor
//!
//! Executes the priced action against the backend and resolves the issuer's
//! step-up challenge in the middle of the attempt. The retry is an explicit
//! bounded counter: one step-up resume per confirmation gesture, with the
//! identical request, and never a second one.

use notapay_gateway::{GatewayError, PaymentGateway};
use notapay_shared::{BillableRequest, Receipt};

use crate::backend::BackendApi;
use crate::classify::{classify_execution, FailureClass};
use crate::error::ExecutionError;
use crate::tokenize::GATEWAY_CONFIRM_TIMEOUT;

/// Executes billable actions over a backend + gateway pair
pub struct Executor<B, G> {
    backend: B,
    gateway: G,
}

impl<B: BackendApi, G: PaymentGateway> Executor<B, G> {
    pub fn new(backend: B, gateway: G) -> Self {
        Self { backend, gateway }
    }

    /// Execute the priced action.
    ///
    /// Invokes the backend at most twice: a second invocation only follows
    /// a successfully confirmed step-up challenge, and re-sends the same
    /// request.
    pub async fn execute(&self, request: &BillableRequest) -> Result<Receipt, ExecutionError> {
        let mut step_up_used = false;

        loop {
            let err = match self.backend.execute_action(request).await {
                Ok(receipt) => {
                    tracing::info!(
                        company_id = %request.company_id,
                        invoice_id = %receipt.invoice_id,
                        amount_cents = request.amount_cents,
                        "Billable action executed"
                    );
                    return Ok(receipt);
                }
                Err(err) => err,
            };

            match classify_execution(&err) {
                FailureClass::StepUpRequired { client_secret } => {
                    if step_up_used {
                        // The issuer asked twice for the same attempt;
                        // surface it instead of risking a duplicate charge
                        tracing::warn!(
                            company_id = %request.company_id,
                            "Second step-up demand for the same attempt"
                        );
                        return Err(ExecutionError::StepUpRepeated);
                    }
                    step_up_used = true;

                    tracing::info!(
                        company_id = %request.company_id,
                        "Step-up authentication required; driving challenge"
                    );
                    self.run_challenge(&client_secret).await?;
                    // Challenge confirmed: re-invoke once with the same request
                }
                _ => return Err(err),
            }
        }
    }

    async fn run_challenge(&self, client_secret: &str) -> Result<(), ExecutionError> {
        let challenge = self.gateway.confirm_card_payment(client_secret);
        match tokio::time::timeout(GATEWAY_CONFIRM_TIMEOUT, challenge).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(ExecutionError::StepUpFailed(err)),
            Err(_) => Err(ExecutionError::StepUpFailed(GatewayError::Timeout)),
        }
    }
}
