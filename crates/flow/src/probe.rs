//! Credential Prober
//!
//! Decides, from the backend subscription snapshot, whether a reusable
//! payment credential is already on file. Runs once per flow-open; the
//! orchestrator caches the result for the life of the flow instance.

use notapay_shared::PaymentCredentialState;

use crate::backend::SubscriptionSource;

/// Heuristic probe for a reusable payment credential
pub struct CredentialProber<S> {
    source: S,
}

impl<S: SubscriptionSource> CredentialProber<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Probe the subscription snapshot.
    ///
    /// Fails open to `Absent` on any backend error: collecting a card the
    /// user already registered is an inconvenience, charging a card that
    /// does not exist is not an option.
    pub async fn probe(&self) -> PaymentCredentialState {
        match self.source.get_current().await {
            Ok(snapshot) => {
                let state = if snapshot.has_reusable_credential {
                    PaymentCredentialState::Present
                } else {
                    PaymentCredentialState::Absent
                };
                tracing::debug!(
                    plan_id = %snapshot.plan_id,
                    credential = ?state,
                    "Probed payment credential"
                );
                state
            }
            Err(err) => {
                tracing::warn!(error = %err, "Credential probe failed; assuming absent");
                PaymentCredentialState::Absent
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;
    use notapay_shared::SubscriptionSnapshot;

    struct FixedSource(Result<SubscriptionSnapshot, ()>);

    impl SubscriptionSource for FixedSource {
        async fn get_current(&self) -> Result<SubscriptionSnapshot, ExecutionError> {
            self.0
                .clone()
                .map_err(|()| ExecutionError::Transport("boom".to_string()))
        }
    }

    fn snapshot(has_credential: bool) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            has_reusable_credential: has_credential,
            plan_id: "pay_per_use".to_string(),
            status: "active".to_string(),
        }
    }

    #[tokio::test]
    async fn test_probe_present() {
        let prober = CredentialProber::new(FixedSource(Ok(snapshot(true))));
        assert_eq!(prober.probe().await, PaymentCredentialState::Present);
    }

    #[tokio::test]
    async fn test_probe_absent() {
        let prober = CredentialProber::new(FixedSource(Ok(snapshot(false))));
        assert_eq!(prober.probe().await, PaymentCredentialState::Absent);
    }

    #[tokio::test]
    async fn test_probe_fails_open_to_absent() {
        let prober = CredentialProber::new(FixedSource(Err(())));
        assert_eq!(prober.probe().await, PaymentCredentialState::Absent);
    }
}
