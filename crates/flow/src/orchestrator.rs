//! Flow Orchestrator
//!
//! The finite-state machine behind the payment-confirmation surface. One
//! instance is created per confirmation surface and per billable request,
//! and destroyed when the surface closes; nothing survives across
//! instances.
//!
//! All transitions originate from a single event source (a user action or
//! one resolved external call), and every external call happens behind a
//! `&mut self` method, so no two network calls of the same instance can
//! ever overlap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use notapay_gateway::{CardDetails, CardInputError, PaymentGateway};
use notapay_shared::{format_brl, BillableRequest, PaymentCredentialState, Receipt};

use crate::backend::{BackendApi, SubscriptionSource};
use crate::classify::{classify_execution, classify_tokenize, FailureClass};
use crate::execute::Executor;
use crate::messages::{user_message, UserMessage};
use crate::probe::CredentialProber;
use crate::tokenize::Tokenizer;

/// Correlation token for one confirmation gesture's outcome.
///
/// Carries the backend's resulting invoice identifier; used only to
/// guarantee the flow never reports two different outcomes for the same
/// gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeAttempt {
    pub invoice_id: String,
}

/// Error shown inline on the credential-collection step
#[derive(Debug, Clone, PartialEq)]
pub enum CollectError {
    /// Widget-level validation failure; never reached the network
    Input(CardInputError),
    /// Classified tokenization failure
    Submission(FailureClass),
}

impl CollectError {
    /// Copy to render next to the card widget
    pub fn user_message(&self) -> &'static str {
        match self {
            CollectError::Input(err) => err.user_message(),
            CollectError::Submission(class) => user_message(class).description,
        }
    }
}

/// The orchestrator's own state. Exactly one is active at a time.
///
/// Failures never terminate the flow: they ride along as the banner on
/// `Confirm` or the inline error on `CollectCredential`, each with a
/// defined recovery path.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    /// Waiting for the user's confirmation gesture
    Confirm { banner: Option<FailureClass> },
    /// Collecting a payment credential through the card widget
    CollectCredential { inline_error: Option<CollectError> },
    /// A charge attempt is in flight; the submit affordance is disabled
    Processing,
    /// Terminal: the action executed and was reported exactly once
    Success { receipt: Receipt },
}

impl FlowState {
    /// The submit affordance is disabled exactly while a charge is in flight
    pub fn allows_submit(&self) -> bool {
        !matches!(self, FlowState::Processing)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Confirm { .. } => "confirm",
            FlowState::CollectCredential { .. } => "collect_credential",
            FlowState::Processing => "processing",
            FlowState::Success { .. } => "success",
        }
    }
}

/// Callbacks exposed to the calling screen
pub trait FlowObserver {
    fn on_success(&self, receipt: &Receipt);
    fn on_cancel(&self);
    fn on_close(&self);
}

/// Handle the screen keeps to abandon the flow on unmount.
///
/// Closing does not cancel an in-flight charge: a call already sent to the
/// backend completes server-side; the flow merely stops listening.
#[derive(Debug, Clone)]
pub struct FlowCloseHandle(Arc<AtomicBool>);

impl FlowCloseHandle {
    pub fn close(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Payment-confirmation flow for one billable request
pub struct ConfirmationFlow<B, G, O> {
    backend: B,
    gateway: G,
    observer: O,
    request: BillableRequest,
    state: FlowState,
    /// Probed once at open; marked present locally after a successful attach
    credential: PaymentCredentialState,
    closed: Arc<AtomicBool>,
    reported: Option<ChargeAttempt>,
}

impl<B, G, O> ConfirmationFlow<B, G, O>
where
    B: BackendApi + SubscriptionSource,
    G: PaymentGateway,
    O: FlowObserver,
{
    /// Open the confirmation surface: probe the payment credential once and
    /// start at `Confirm`
    pub async fn open(backend: B, gateway: G, observer: O, request: BillableRequest) -> Self {
        let credential = CredentialProber::new(&backend).probe().await;

        tracing::info!(
            company_id = %request.company_id,
            amount_cents = request.amount_cents,
            credential = ?credential,
            "Confirmation flow opened"
        );

        Self {
            backend,
            gateway,
            observer,
            request,
            state: FlowState::Confirm { banner: None },
            credential,
            closed: Arc::new(AtomicBool::new(false)),
            reported: None,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn credential_state(&self) -> PaymentCredentialState {
        self.credential
    }

    /// The request this flow instance is bound to (read-only)
    pub fn request(&self) -> &BillableRequest {
        &self.request
    }

    /// Submit affordance is disabled exactly while a charge is in flight
    pub fn submit_enabled(&self) -> bool {
        self.state.allows_submit()
    }

    /// Label of the submit affordance for the current state
    pub fn submit_label(&self) -> String {
        let collecting = matches!(self.state, FlowState::CollectCredential { .. });
        if collecting || !self.credential.is_present() {
            "Adicionar cartão".to_string()
        } else {
            format!("Confirmar — {}", format_brl(self.request.amount_cents))
        }
    }

    /// Classified failure currently displayed as the confirm-screen banner
    pub fn banner(&self) -> Option<&FailureClass> {
        match &self.state {
            FlowState::Confirm { banner } => banner.as_ref(),
            _ => None,
        }
    }

    /// Catalog entry for the banner, if one is showing
    pub fn banner_message(&self) -> Option<UserMessage> {
        self.banner().map(user_message)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Handle for the screen to abandon the flow on unmount
    pub fn close_handle(&self) -> FlowCloseHandle {
        FlowCloseHandle(Arc::clone(&self.closed))
    }

    /// The user's confirmation gesture. Runs the charge when a credential is
    /// on file, otherwise moves to credential collection.
    pub async fn confirm(&mut self) {
        if self.is_closed() || !matches!(self.state, FlowState::Confirm { .. }) {
            return;
        }

        if self.credential.is_present() {
            self.run_charge().await;
        } else {
            self.transition(FlowState::CollectCredential { inline_error: None });
        }
    }

    /// Submit the card widget's input while collecting a credential.
    ///
    /// Widget-level validation errors surface inline without any network
    /// traffic. On success the cached credential state flips to present and
    /// the flow returns to `Confirm`; the card input is dropped either way.
    pub async fn submit_card(&mut self, card: CardDetails) {
        if self.is_closed() || !matches!(self.state, FlowState::CollectCredential { .. }) {
            return;
        }

        if let Err(err) = card.validate() {
            self.transition(FlowState::CollectCredential {
                inline_error: Some(CollectError::Input(err)),
            });
            return;
        }

        let tokenizer = Tokenizer::new(&self.backend, &self.gateway);
        let result = tokenizer.attach_reusable_credential(&card).await;
        drop(card);

        if self.is_closed() {
            return;
        }

        match result {
            Ok(()) => {
                self.credential = PaymentCredentialState::Present;
                self.transition(FlowState::Confirm { banner: None });
            }
            Err(err) => {
                let class = classify_tokenize(&err);
                tracing::warn!(class = ?class, "Credential collection failed");
                self.transition(FlowState::CollectCredential {
                    inline_error: Some(CollectError::Submission(class)),
                });
            }
        }
    }

    /// The user dismissed the flow without completing it
    pub fn cancel(&mut self) {
        if self.is_closed() {
            return;
        }
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!(state = self.state.name(), "Confirmation flow cancelled");
        self.observer.on_cancel();
    }

    /// The confirmation surface is closing (success acknowledged or
    /// explicit dismissal)
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!(state = self.state.name(), "Confirmation flow closed");
        self.observer.on_close();
    }

    /// One charge episode. Entered only from `Confirm` (or from
    /// `CollectCredential` through `Confirm`); the `Processing` state keeps
    /// the submit affordance disabled until the episode resolves.
    async fn run_charge(&mut self) {
        self.transition(FlowState::Processing);

        let executor = Executor::new(&self.backend, &self.gateway);
        let result = executor.execute(&self.request).await;

        // The surface may have unmounted while the call was in flight; the
        // charge stands server-side but nothing is reported
        if self.is_closed() {
            tracing::debug!("Flow closed during processing; dropping outcome");
            return;
        }

        match result {
            Ok(receipt) => {
                if self.reported.is_some() {
                    tracing::warn!(
                        invoice_id = %receipt.invoice_id,
                        "Duplicate charge resolution ignored"
                    );
                    return;
                }
                self.reported = Some(ChargeAttempt {
                    invoice_id: receipt.invoice_id.clone(),
                });
                self.transition(FlowState::Success {
                    receipt: receipt.clone(),
                });
                self.observer.on_success(&receipt);
            }
            Err(err) => match classify_execution(&err) {
                FailureClass::CredentialRequired => {
                    // The probe's heuristic was wrong; collect a card now
                    self.credential = PaymentCredentialState::Absent;
                    self.transition(FlowState::CollectCredential { inline_error: None });
                }
                class => {
                    self.transition(FlowState::Confirm {
                        banner: Some(class),
                    });
                }
            },
        }
    }

    fn transition(&mut self, next: FlowState) {
        tracing::debug!(from = self.state.name(), to = next.name(), "Flow transition");
        self.state = next;
    }
}
