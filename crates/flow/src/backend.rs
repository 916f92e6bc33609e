//! Fiscal backend API client
//!
//! The flow consumes three backend endpoints: the subscription snapshot,
//! setup-intent creation, and the priced-action endpoint. Each is behind a
//! trait so tests can inject fakes (the orchestrator never sees reqwest).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use notapay_shared::{BillableRequest, CompanyId, ConfigError, Receipt, SubscriptionSnapshot};

use crate::error::ExecutionError;

/// Timeout for backend requests (30 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only source of the company's subscription snapshot.
///
/// Injected into the Credential Prober instead of being read from ambient
/// state, so tests can substitute fakes.
#[allow(async_fn_in_trait)]
pub trait SubscriptionSource: Send + Sync {
    async fn get_current(&self) -> Result<SubscriptionSnapshot, ExecutionError>;
}

/// Backend operations consumed by the Tokenizer and the Executor
#[allow(async_fn_in_trait)]
pub trait BackendApi: Send + Sync {
    /// Mint a setup intent for attaching a reusable credential; returns the
    /// gateway client secret
    async fn create_setup_intent(&self) -> Result<String, ExecutionError>;

    /// Execute the priced action. Backend-signaled errors (including the
    /// step-up demand) come back as [`ExecutionError::Backend`]
    async fn execute_action(&self, request: &BillableRequest) -> Result<Receipt, ExecutionError>;
}

impl<T: SubscriptionSource> SubscriptionSource for &T {
    async fn get_current(&self) -> Result<SubscriptionSnapshot, ExecutionError> {
        (**self).get_current().await
    }
}

impl<T: BackendApi> BackendApi for &T {
    async fn create_setup_intent(&self) -> Result<String, ExecutionError> {
        (**self).create_setup_intent().await
    }

    async fn execute_action(&self, request: &BillableRequest) -> Result<Receipt, ExecutionError> {
        (**self).execute_action(request).await
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetupIntentResponse {
    client_secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteActionBody<'a> {
    action_type: &'static str,
    action_data: &'a BillableRequest,
    company_id: CompanyId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorData {
    client_secret: Option<String>,
}

/// `POST action/execute` envelope:
/// `{ status: "success", data } | { status: "error", code, message, data? }`
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum ExecuteEnvelope {
    Success {
        data: Receipt,
    },
    Error {
        code: String,
        message: Option<String>,
        data: Option<ErrorData>,
    },
}

// =============================================================================
// HTTP client
// =============================================================================

/// Configuration for the fiscal backend client
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend API, without trailing slash
    pub base_url: String,
    /// Bearer token of the authenticated session
    pub api_token: String,
}

impl BackendConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: ConfigError::require("NOTAPAY_API_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            api_token: ConfigError::require("NOTAPAY_API_TOKEN")?,
        })
    }
}

/// Fiscal backend client over HTTP/JSON
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, ExecutionError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExecutionError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    /// Turn a non-2xx response without a parseable envelope into an error
    async fn error_from_response(response: reqwest::Response) -> ExecutionError {
        let status = response.status().as_u16();
        let message = response.text().await.ok().filter(|t| !t.is_empty());
        ExecutionError::Backend {
            status,
            code: None,
            message,
            client_secret: None,
        }
    }
}

impl SubscriptionSource for HttpBackend {
    async fn get_current(&self) -> Result<SubscriptionSnapshot, ExecutionError> {
        let response = self
            .http
            .get(self.url("subscription/current"))
            .bearer_auth(&self.config.api_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(response.json().await?)
    }
}

impl BackendApi for HttpBackend {
    async fn create_setup_intent(&self) -> Result<String, ExecutionError> {
        let response = self
            .http
            .post(self.url("payment/setup-intent"))
            .bearer_auth(&self.config.api_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: SetupIntentResponse = response.json().await?;
        Ok(body.client_secret)
    }

    async fn execute_action(&self, request: &BillableRequest) -> Result<Receipt, ExecutionError> {
        let response = self
            .http
            .post(self.url("action/execute"))
            .bearer_auth(&self.config.api_token)
            .json(&ExecuteActionBody {
                action_type: "emit_invoice",
                action_data: request,
                company_id: request.company_id,
            })
            .send()
            .await?;

        // The envelope carries the real signal; the HTTP status alone only
        // matters when there is no envelope (e.g. a 402 from a proxy)
        let status = response.status().as_u16();
        let text = response.text().await?;

        match serde_json::from_str::<ExecuteEnvelope>(&text) {
            Ok(ExecuteEnvelope::Success { data }) => Ok(data),
            Ok(ExecuteEnvelope::Error {
                code,
                message,
                data,
            }) => Err(ExecutionError::Backend {
                status,
                code: Some(code),
                message,
                client_secret: data.and_then(|d| d.client_secret),
            }),
            Err(_) if !(200..300).contains(&status) => Err(ExecutionError::Backend {
                status,
                code: None,
                message: Some(text).filter(|t| !t.is_empty()),
                client_secret: None,
            }),
            Err(e) => Err(ExecutionError::InvalidResponse(e.to_string())),
        }
    }
}
