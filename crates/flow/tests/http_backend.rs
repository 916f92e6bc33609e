//! Wire-contract tests for the fiscal backend client

#![allow(clippy::unwrap_used)]

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notapay_flow::{
    classify_execution, BackendApi, BackendConfig, ExecutionError, FailureClass, HttpBackend,
    SubscriptionSource,
};
use notapay_shared::{BillableRequest, CompanyId, InvoiceStatus};

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(BackendConfig {
        base_url: server.uri(),
        api_token: "test-token".to_string(),
    })
    .unwrap()
}

fn request() -> BillableRequest {
    BillableRequest {
        client_name: "Oficina do Zé ME".to_string(),
        client_document: "98765432000121".to_string(),
        description: "Manutenção preventiva".to_string(),
        amount_cents: 45_000,
        tax_rate_bps: 200,
        municipality_code: "3106200".to_string(),
        company_id: CompanyId::new(),
    }
}

#[tokio::test]
async fn test_subscription_snapshot_roundtrip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscription/current"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hasReusableCredential": true,
            "planId": "pay_per_use",
            "status": "active"
        })))
        .mount(&server)
        .await;

    let snapshot = backend_for(&server).get_current().await.unwrap();
    assert!(snapshot.has_reusable_credential);
    assert_eq!(snapshot.plan_id, "pay_per_use");
}

#[tokio::test]
async fn test_setup_intent_returns_client_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/setup-intent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "clientSecret": "seti_1_secret_9" })),
        )
        .mount(&server)
        .await;

    let secret = backend_for(&server).create_setup_intent().await.unwrap();
    assert_eq!(secret, "seti_1_secret_9");
}

#[tokio::test]
async fn test_execute_sends_envelope_and_parses_receipt() {
    let server = MockServer::start().await;
    let req = request();
    Mock::given(method("POST"))
        .and(path("/action/execute"))
        .and(body_partial_json(json!({
            "actionType": "emit_invoice",
            "companyId": req.company_id,
            "actionData": { "amountCents": 45_000 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "invoiceId": "nf-2026-0042",
                "status": "authorized",
                "verificationCode": "ZZ99-XX11",
                "issuedAt": "2026-08-24T12:00:00Z"
            }
        })))
        .mount(&server)
        .await;

    let receipt = backend_for(&server).execute_action(&req).await.unwrap();
    assert_eq!(receipt.invoice_id, "nf-2026-0042");
    assert_eq!(receipt.status, InvoiceStatus::Authorized);
    assert!(receipt.issued_at.is_some());
}

#[tokio::test]
async fn test_error_envelope_carries_code_and_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/action/execute"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "error",
            "code": "PAYMENT_REQUIRES_ACTION",
            "message": "Authentication required",
            "data": { "clientSecret": "pi_7_secret_q" }
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .execute_action(&request())
        .await
        .unwrap_err();
    assert_eq!(
        classify_execution(&err),
        FailureClass::StepUpRequired {
            client_secret: "pi_7_secret_q".to_string()
        }
    );
}

#[tokio::test]
async fn test_bare_402_classifies_credential_required() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/action/execute"))
        .respond_with(ResponseTemplate::new(402).set_body_string("Payment Required"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .execute_action(&request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::Backend {
            status: 402,
            code: None,
            ..
        }
    ));
    assert_eq!(classify_execution(&err), FailureClass::CredentialRequired);
}

#[tokio::test]
async fn test_garbage_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/action/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .execute_action(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::InvalidResponse(_)));
    assert_eq!(classify_execution(&err), FailureClass::Unknown);
}

#[tokio::test]
async fn test_connection_failure_is_transient() {
    // A non-pooled server: `MockServer::start()` hands out a pooled instance
    // whose listener stays alive after drop and answers 404 to everything.
    let server = MockServer::builder().start().await;
    let backend = backend_for(&server);
    drop(server); // port goes away; the request gets no response

    let err = backend.execute_action(&request()).await.unwrap_err();
    assert!(matches!(err, ExecutionError::Transport(_)));
    assert_eq!(classify_execution(&err), FailureClass::Transient);
}
